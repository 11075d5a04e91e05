use tempfile::TempDir;

use noteweave_knowledge::seed::{CHEAT_SHEET_TITLE, WELCOME_TITLE};
use noteweave_knowledge::storage::KnowledgeStore;
use noteweave_knowledge::{
    KnowledgeEngine, KnowledgeError, KnowledgeSettings, Link, LinkBasis, NoteCreateRequest,
    NoteUpdateRequest, extract_links,
};

fn settings(temp: &TempDir, seed: bool) -> KnowledgeSettings {
    KnowledgeSettings {
        data_root_override: Some(temp.path().to_path_buf()),
        seed_welcome_notes: seed,
        ..Default::default()
    }
}

fn create(title: &str, content: &str, tags: &[&str]) -> NoteCreateRequest {
    NoteCreateRequest {
        title: Some(title.to_string()),
        content: Some(content.to_string()),
        tags: Some(tags.iter().map(|t| t.to_string()).collect()),
    }
}

#[tokio::test]
async fn test_seeds_empty_store_once() {
    let temp = TempDir::new().expect("tempdir");

    let engine = KnowledgeEngine::open(settings(&temp, true)).await.unwrap();
    let notes = engine.list_notes().await.unwrap();
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0].title, WELCOME_TITLE);
    assert_eq!(notes[1].title, CHEAT_SHEET_TITLE);

    let links = engine.links().await;
    assert_eq!(links, vec![Link::reference(&notes[0].id, &notes[1].id)]);
    drop(engine);

    let reopened = KnowledgeEngine::open(settings(&temp, true)).await.unwrap();
    assert_eq!(reopened.list_notes().await.unwrap().len(), 2);
    assert_eq!(reopened.links().await.len(), 1);
}

#[tokio::test]
async fn test_engine_links_track_edits() {
    let store = KnowledgeStore::open_in_memory().await.unwrap();
    let engine = KnowledgeEngine::from_store(KnowledgeSettings::default(), store)
        .await
        .unwrap();
    for note in engine.list_notes().await.unwrap() {
        engine.delete_note(&note.id).await.unwrap();
    }
    assert!(engine.links().await.is_empty());

    let first = engine.create_note(create("First", "", &["a", "b"])).await.unwrap();
    let second = engine.create_note(create("Second", "", &["b", "c"])).await.unwrap();
    let third = engine.create_note(create("Third", "", &["d"])).await.unwrap();

    assert_eq!(
        engine.links().await,
        vec![Link::shared_tag(&first.id, &second.id, 1)]
    );

    let marker = format!("Back to [[the start|{}]]", first.id);
    engine
        .update_note(
            &third.id,
            NoteUpdateRequest {
                content: Some(marker),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let links = engine.links().await;
    assert!(links.contains(&Link::reference(&third.id, &first.id)));

    // Creation order is the canonical input order.
    let mut snapshot = engine.list_notes().await.unwrap();
    snapshot.reverse();
    assert_eq!(links, extract_links(&snapshot));

    let related = engine.related(&first.id, None).await.unwrap();
    let ids: Vec<&str> = related.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec![second.id.as_str(), third.id.as_str()]);
    assert_eq!(related[1].bases, vec![LinkBasis::Reference]);

    assert!(engine.delete_note(&first.id).await.unwrap());
    assert!(engine.links().await.is_empty());
    assert!(matches!(
        engine.related(&first.id, None).await,
        Err(KnowledgeError::UnknownNote(_))
    ));
}

#[tokio::test]
async fn test_graph_counts_connections() {
    let store = KnowledgeStore::open_in_memory().await.unwrap();
    let settings = KnowledgeSettings {
        seed_welcome_notes: false,
        ..Default::default()
    };
    let engine = KnowledgeEngine::from_store(settings, store).await.unwrap();

    let hub = engine.create_note(create("Hub", "", &["x"])).await.unwrap();
    let content = format!("[[hub|{0}]] [[hub again|{0}]]", hub.id);
    let spoke = engine.create_note(create("Spoke", &content, &["x"])).await.unwrap();
    engine.create_note(create("Alone", "", &[])).await.unwrap();

    let graph = engine.graph().await;
    assert_eq!(graph.nodes.len(), 3);
    assert_eq!(graph.nodes[2].title, "Alone");
    assert_eq!(graph.node(&hub.id).unwrap().connections, 3);
    assert_eq!(graph.edges.len(), 1);
    assert_eq!(graph.edges[0].source, hub.id);
    assert_eq!(graph.edges[0].target, spoke.id);
    assert_eq!(graph.edges[0].weight, 3);
}

#[tokio::test]
async fn test_update_unknown_note_fails() {
    let store = KnowledgeStore::open_in_memory().await.unwrap();
    let engine = KnowledgeEngine::from_store(KnowledgeSettings::default(), store)
        .await
        .unwrap();

    let err = engine
        .update_note("nope", NoteUpdateRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, KnowledgeError::UnknownNote(id) if id == "nope"));
    assert!(!engine.delete_note("nope").await.unwrap());
}

#[tokio::test]
async fn test_search_and_tags() {
    let store = KnowledgeStore::open_in_memory().await.unwrap();
    let engine = KnowledgeEngine::from_store(KnowledgeSettings::default(), store)
        .await
        .unwrap();

    let hits = engine.search("cheat").await.unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(
        engine.tags().await.unwrap(),
        vec!["getting-started", "markdown", "reference", "welcome"]
    );

    let matches = engine
        .search_terms(&["markdown".to_string(), "tables".to_string()])
        .await
        .unwrap();
    assert_eq!(matches[0].title, CHEAT_SHEET_TITLE);
    assert_eq!(matches[0].matched, vec!["markdown", "tables"]);
}

async fn empty_engine() -> KnowledgeEngine {
    let store = KnowledgeStore::open_in_memory().await.unwrap();
    let settings = KnowledgeSettings {
        seed_welcome_notes: false,
        ..Default::default()
    };
    KnowledgeEngine::from_store(settings, store).await.unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_deleted_note_stays_deleted_under_concurrent_update() {
    let engine = empty_engine().await;

    for round in 0..50 {
        let note = engine
            .create_note(create("Draft", "", &["t"]))
            .await
            .unwrap();

        let updater = {
            let engine = engine.clone();
            let id = note.id.clone();
            tokio::spawn(async move {
                engine
                    .update_note(
                        &id,
                        NoteUpdateRequest {
                            content: Some(format!("round {round}")),
                            ..Default::default()
                        },
                    )
                    .await
            })
        };
        let deleter = {
            let engine = engine.clone();
            let id = note.id.clone();
            tokio::spawn(async move { engine.delete_note(&id).await })
        };

        let updated = updater.await.unwrap();
        assert!(deleter.await.unwrap().unwrap());
        if let Err(err) = updated {
            assert!(matches!(err, KnowledgeError::UnknownNote(_)));
        }

        assert!(engine.get_note(&note.id).await.unwrap().is_none());
        assert!(engine.graph().await.node(&note.id).is_none());
    }
    assert!(engine.list_notes().await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_partial_updates_keep_both_fields() {
    let engine = empty_engine().await;

    for _ in 0..50 {
        let note = engine.create_note(create("Draft", "", &[])).await.unwrap();

        let titler = {
            let engine = engine.clone();
            let id = note.id.clone();
            tokio::spawn(async move {
                engine
                    .update_note(
                        &id,
                        NoteUpdateRequest {
                            title: Some("T".to_string()),
                            ..Default::default()
                        },
                    )
                    .await
            })
        };
        let writer = {
            let engine = engine.clone();
            let id = note.id.clone();
            tokio::spawn(async move {
                engine
                    .update_note(
                        &id,
                        NoteUpdateRequest {
                            content: Some("C".to_string()),
                            tags: Some(vec!["t".to_string()]),
                            ..Default::default()
                        },
                    )
                    .await
            })
        };
        titler.await.unwrap().unwrap();
        writer.await.unwrap().unwrap();

        let stored = engine.get_note(&note.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "T");
        assert_eq!(stored.content, "C");
        assert_eq!(stored.tags, vec!["t"]);
    }
}
