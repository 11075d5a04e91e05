//! HTTP client for the gateway API.

use noteweave_core::{
    AiRequest, AiResponse, DeleteResponse, ErrorResponse, HealthResponse, Settings,
};
use noteweave_knowledge::{GraphView, Note, NoteCreateRequest, NoteUpdateRequest, RelatedNote};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Gateway unreachable: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Gateway returned {status}: {message}")]
    Api { status: StatusCode, message: String },
}

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: String,
}

impl GatewayClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn health(&self) -> ClientResult<HealthResponse> {
        decode(self.http.get(self.url("/health")).send().await?).await
    }

    /// List notes, optionally filtered by a search query.
    pub async fn list_notes(&self, query: Option<&str>) -> ClientResult<Vec<Note>> {
        let mut request = self.http.get(self.url("/notes"));
        if let Some(q) = query {
            request = request.query(&[("q", q)]);
        }
        decode(request.send().await?).await
    }

    pub async fn create_note(&self, request: &NoteCreateRequest) -> ClientResult<Note> {
        decode(
            self.http
                .post(self.url("/notes"))
                .json(request)
                .send()
                .await?,
        )
        .await
    }

    pub async fn get_note(&self, id: &str) -> ClientResult<Note> {
        decode(self.http.get(self.url(&format!("/notes/{id}"))).send().await?).await
    }

    /// Apply a partial update; fields left `None` keep their stored value.
    pub async fn update_note(&self, id: &str, request: &NoteUpdateRequest) -> ClientResult<Note> {
        decode(
            self.http
                .put(self.url(&format!("/notes/{id}")))
                .json(request)
                .send()
                .await?,
        )
        .await
    }

    pub async fn delete_note(&self, id: &str) -> ClientResult<bool> {
        let response: DeleteResponse =
            decode(self.http.delete(self.url(&format!("/notes/{id}"))).send().await?).await?;
        Ok(response.deleted)
    }

    pub async fn related(&self, id: &str, limit: Option<usize>) -> ClientResult<Vec<RelatedNote>> {
        let mut request = self.http.get(self.url(&format!("/notes/{id}/related")));
        if let Some(limit) = limit {
            request = request.query(&[("limit", limit)]);
        }
        decode(request.send().await?).await
    }

    pub async fn graph(&self) -> ClientResult<GraphView> {
        decode(self.http.get(self.url("/graph")).send().await?).await
    }

    pub async fn tags(&self) -> ClientResult<Vec<String>> {
        decode(self.http.get(self.url("/tags")).send().await?).await
    }

    pub async fn ai(&self, action: &str, content: &str) -> ClientResult<AiResponse> {
        let body = AiRequest {
            action: action.to_string(),
            content: content.to_string(),
        };
        decode(self.http.post(self.url("/ai")).json(&body).send().await?).await
    }

    pub async fn settings(&self) -> ClientResult<Settings> {
        decode(self.http.get(self.url("/settings")).send().await?).await
    }

    /// Replace the gateway settings. The gateway validates and persists them.
    pub async fn update_settings(&self, settings: &Settings) -> ClientResult<Settings> {
        decode(
            self.http
                .put(self.url("/settings"))
                .json(settings)
                .send()
                .await?,
        )
        .await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }
    let text = response.text().await?;
    let message = serde_json::from_str::<ErrorResponse>(&text)
        .map(|e| e.error)
        .unwrap_or(text);
    Err(ClientError::Api { status, message })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use noteweave_gateway::server;
    use noteweave_gateway::state::AppState;
    use noteweave_knowledge::storage::KnowledgeStore;
    use noteweave_knowledge::{KnowledgeEngine, KnowledgeSettings};

    use super::*;

    async fn spawn_gateway() -> GatewayClient {
        let store = KnowledgeStore::open_in_memory().await.unwrap();
        let engine = KnowledgeEngine::from_store(KnowledgeSettings::default(), store)
            .await
            .unwrap();
        let state = AppState::new(engine, Settings::default());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(server::serve(listener, Arc::new(state)));
        GatewayClient::new(format!("http://{addr}/"))
    }

    #[tokio::test]
    async fn test_client_talks_to_gateway() {
        let client = spawn_gateway().await;

        assert_eq!(client.health().await.unwrap().status, "ok");
        assert_eq!(client.list_notes(None).await.unwrap().len(), 2);

        let note = client
            .create_note(&NoteCreateRequest {
                title: Some("Reading list".to_string()),
                tags: Some(vec!["markdown".to_string()]),
                ..Default::default()
            })
            .await
            .unwrap();
        let related = client.related(&note.id, Some(3)).await.unwrap();
        assert_eq!(related.len(), 1);

        let found = client.list_notes(Some("reading")).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(client.graph().await.unwrap().nodes.len(), 3);
        assert!(client.tags().await.unwrap().contains(&"markdown".to_string()));
        assert!(client.delete_note(&note.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_client_opens_and_edits_notes() {
        let client = spawn_gateway().await;

        let note = client
            .create_note(&NoteCreateRequest {
                title: Some("Draft".to_string()),
                content: Some("first pass".to_string()),
                tags: Some(vec!["wip".to_string()]),
            })
            .await
            .unwrap();

        let opened = client.get_note(&note.id).await.unwrap();
        assert_eq!(opened.content, "first pass");

        let edited = client
            .update_note(&note.id, &crate::edit::note_update("Final", "", None))
            .await
            .unwrap();
        assert_eq!(edited.title, "Final");
        assert_eq!(edited.content, "first pass");
        assert_eq!(edited.tags, vec!["wip"]);

        let edited = client
            .update_note(
                &note.id,
                &crate::edit::note_update("", "-", Some("done".to_string())),
            )
            .await
            .unwrap();
        assert_eq!(edited.title, "Final");
        assert_eq!(edited.content, "done");
        assert!(edited.tags.is_empty());

        assert!(client.delete_note(&note.id).await.unwrap());
        match client.get_note(&note.id).await {
            Err(ClientError::Api { status, .. }) => assert_eq!(status, StatusCode::NOT_FOUND),
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_client_changes_settings() {
        let client = spawn_gateway().await;

        let current = client.settings().await.unwrap();
        let changed = crate::edit::apply_setting(&current, "editor.font_size", "18").unwrap();
        let saved = client.update_settings(&changed).await.unwrap();
        assert_eq!(saved.editor.font_size, 18);
        assert_eq!(client.settings().await.unwrap().editor.font_size, 18);

        let invalid = crate::edit::apply_setting(&saved, "editor.font_size", "99").unwrap();
        match client.update_settings(&invalid).await {
            Err(ClientError::Api { status, .. }) => assert_eq!(status, StatusCode::BAD_REQUEST),
            other => panic!("expected API error, got {other:?}"),
        }
        assert_eq!(client.settings().await.unwrap().editor.font_size, 18);
    }

    #[tokio::test]
    async fn test_client_surfaces_gateway_errors() {
        let client = spawn_gateway().await;

        match client.ai("summarize", "text").await {
            Err(ClientError::Api { status, message }) => {
                assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
                assert!(message.contains("disabled"));
            }
            other => panic!("expected API error, got {other:?}"),
        }

        match client.related("missing", None).await {
            Err(ClientError::Api { status, .. }) => assert_eq!(status, StatusCode::NOT_FOUND),
            other => panic!("expected API error, got {other:?}"),
        }
    }
}
