use std::io::{self, Write};

use noteweave_core::AiAction;
use noteweave_knowledge::{GraphView, Note, NoteCreateRequest};
use tracing::{info, warn};

mod client;
mod edit;

use client::GatewayClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    noteweave_core::load_dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = noteweave_core::Settings::load()?;
    let gateway_url =
        std::env::var("NOTEWEAVE_GATEWAY_URL").unwrap_or_else(|_| settings.gateway_url());
    info!("Settings loaded, using {}", gateway_url);

    let client = GatewayClient::new(&gateway_url);
    match client.health().await {
        Ok(health) => {
            let ai = if health.ai_available { "on" } else { "off" };
            println!(
                "Connected to noteweave {} at {} (AI {})",
                health.version, gateway_url, ai
            );
        }
        Err(e) => {
            warn!("Health check failed: {}", e);
            eprintln!(
                "Cannot reach the gateway at {}. Is noteweave-gateway running?",
                gateway_url
            );
            return Ok(());
        }
    }

    loop {
        let selection = show_menu()?;
        let result = match selection.as_str() {
            "1" => list_notes(&client, None).await,
            "2" => {
                let query = prompt("Search for: ")?;
                list_notes(&client, Some(&query)).await
            }
            "3" => show_note(&client).await,
            "4" => create_note(&client).await,
            "5" => edit_note(&client).await,
            "6" => delete_note(&client).await,
            "7" => show_graph(&client).await,
            "8" => show_related(&client).await,
            "9" => show_tags(&client).await,
            "10" => run_ai(&client).await,
            "11" => show_settings(&client).await,
            "12" => change_setting(&client).await,
            "q" | "Q" => {
                println!("Bye.");
                return Ok(());
            }
            _ => {
                println!("Invalid selection");
                Ok(())
            }
        };

        if let Err(e) = result {
            eprintln!("Error: {}", e);
        }
    }
}

/// Show the main menu and return the user's selection
fn show_menu() -> io::Result<String> {
    println!("\n╔════════════════════════════════════╗");
    println!("║          noteweave CLI             ║");
    println!("╠════════════════════════════════════╣");
    println!("║  1. List notes                     ║");
    println!("║  2. Search notes                   ║");
    println!("║  3. Open note                      ║");
    println!("║  4. Create note                    ║");
    println!("║  5. Edit note                      ║");
    println!("║  6. Delete note                    ║");
    println!("║  7. Show graph                     ║");
    println!("║  8. Related notes                  ║");
    println!("║  9. List tags                      ║");
    println!("║ 10. AI helper                      ║");
    println!("║ 11. Show settings                  ║");
    println!("║ 12. Change setting                 ║");
    println!("║  q. Quit                           ║");
    println!("╚════════════════════════════════════╝");
    prompt("\nSelect [1-12, q]: ")
}

fn prompt(label: &str) -> io::Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Read lines until a lone "." or end of input.
fn prompt_multiline(label: &str) -> io::Result<String> {
    println!("{} (end with a line containing only '.')", label);
    let mut lines = Vec::new();
    loop {
        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim_end_matches(['\n', '\r']);
        if line == "." {
            break;
        }
        lines.push(line.to_string());
    }
    Ok(lines.join("\n"))
}

fn print_notes(notes: &[Note]) {
    if notes.is_empty() {
        println!("No notes.");
        return;
    }
    for (i, note) in notes.iter().enumerate() {
        let tags = if note.tags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", note.tags.join(", "))
        };
        println!(
            "  {}. {}{} (ID: {}) - updated {}",
            i + 1,
            note.title,
            tags,
            note.id,
            note.updated_at.format("%Y-%m-%d %H:%M")
        );
    }
}

async fn list_notes(
    client: &GatewayClient,
    query: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let notes = client.list_notes(query).await?;
    println!("\n=== Notes ({}) ===\n", notes.len());
    print_notes(&notes);
    Ok(())
}

async fn create_note(client: &GatewayClient) -> Result<(), Box<dyn std::error::Error>> {
    let title = prompt("Title: ")?;
    let tags = prompt("Tags (comma separated): ")?;
    let content = prompt_multiline("Content")?;

    let request = NoteCreateRequest {
        title: Some(title),
        content: Some(content),
        tags: Some(tags.split(',').map(str::to_string).collect()),
    };
    let note = client.create_note(&request).await?;
    println!("Created \"{}\" (ID: {})", note.title, note.id);
    println!("Link to it with [[{}|{}]]", note.title, note.id);
    Ok(())
}

async fn show_note(client: &GatewayClient) -> Result<(), Box<dyn std::error::Error>> {
    let id = prompt("Note ID: ")?;
    let note = client.get_note(&id).await?;

    println!("\n=== {} ===", note.title);
    if !note.tags.is_empty() {
        println!("Tags: {}", note.tags.join(", "));
    }
    println!(
        "Created {} - updated {}\n",
        note.created_at.format("%Y-%m-%d %H:%M"),
        note.updated_at.format("%Y-%m-%d %H:%M")
    );
    println!("{}", note.content);
    Ok(())
}

async fn edit_note(client: &GatewayClient) -> Result<(), Box<dyn std::error::Error>> {
    let id = prompt("Note ID: ")?;
    let note = client.get_note(&id).await?;

    println!("Editing \"{}\". Leave a field blank to keep it.", note.title);
    let title = prompt(&format!("Title [{}]: ", note.title))?;
    let tags = prompt(&format!("Tags [{}] ('-' clears): ", note.tags.join(", ")))?;
    let replace = prompt("Replace content? [y/N]: ")?;
    let content = if replace.eq_ignore_ascii_case("y") {
        Some(prompt_multiline("Content")?)
    } else {
        None
    };

    let note = client
        .update_note(&id, &edit::note_update(&title, &tags, content))
        .await?;
    println!("Saved \"{}\" (ID: {})", note.title, note.id);
    Ok(())
}

fn print_graph(graph: &GraphView) {
    println!("\n=== Notes by connections ===\n");
    for node in &graph.nodes {
        println!("  {:>3}  {} (ID: {})", node.connections, node.title, node.id);
    }

    println!("\n=== Edges ===\n");
    if graph.edges.is_empty() {
        println!("No connections yet.");
    }
    let title = |id: &str| {
        graph
            .node(id)
            .map(|n| n.title.clone())
            .unwrap_or_else(|| id.to_string())
    };
    for edge in &graph.edges {
        let bases: Vec<String> = edge.bases.iter().map(|b| b.to_string()).collect();
        println!(
            "  {} -- {} [{}] x{}",
            title(&edge.source),
            title(&edge.target),
            bases.join(", "),
            edge.weight
        );
    }
}

async fn show_graph(client: &GatewayClient) -> Result<(), Box<dyn std::error::Error>> {
    let graph = client.graph().await?;
    print_graph(&graph);
    Ok(())
}

async fn show_related(client: &GatewayClient) -> Result<(), Box<dyn std::error::Error>> {
    let id = prompt("Note ID: ")?;
    let limit = prompt("How many (blank for default): ")?;
    let limit = limit.parse().ok();

    let related = client.related(&id, limit).await?;
    if related.is_empty() {
        println!("No related notes.");
    }
    for (i, note) in related.iter().enumerate() {
        let bases: Vec<String> = note.bases.iter().map(|b| b.to_string()).collect();
        println!(
            "  {}. {} (weight {}, {}) (ID: {})",
            i + 1,
            note.title,
            note.weight,
            bases.join(", "),
            note.id
        );
    }
    Ok(())
}

async fn show_tags(client: &GatewayClient) -> Result<(), Box<dyn std::error::Error>> {
    let tags = client.tags().await?;
    if tags.is_empty() {
        println!("No tags.");
    } else {
        println!("{}", tags.join(", "));
    }
    Ok(())
}

async fn run_ai(client: &GatewayClient) -> Result<(), Box<dyn std::error::Error>> {
    println!("\nActions:");
    for (i, action) in AiAction::ALL.iter().enumerate() {
        println!("  {}. {}", i + 1, action);
    }
    let choice = prompt("Action (number or name): ")?;
    let action = match choice.parse::<usize>() {
        Ok(n) if (1..=AiAction::ALL.len()).contains(&n) => AiAction::ALL[n - 1].to_string(),
        _ => choice,
    };

    let content = prompt_multiline("Content")?;
    let response = client.ai(&action, &content).await?;

    println!("\n{}", response.result);
    if !response.tags.is_empty() {
        println!("\nTags: {}", response.tags.join(", "));
    }
    if !response.terms.is_empty() {
        println!("\nTerms: {}", response.terms.join(", "));
    }
    if !response.matches.is_empty() {
        println!("\nMatching notes:");
        for id in &response.matches {
            println!("  {}", id);
        }
    }
    Ok(())
}

async fn show_settings(client: &GatewayClient) -> Result<(), Box<dyn std::error::Error>> {
    let settings = client.settings().await?;
    println!("\n{}", settings.to_toml()?);
    Ok(())
}

async fn change_setting(client: &GatewayClient) -> Result<(), Box<dyn std::error::Error>> {
    let current = client.settings().await?;
    let key = prompt("Setting (e.g. editor.font_size): ")?;
    let raw = prompt("Value: ")?;

    let settings = edit::apply_setting(&current, &key, &raw)?;
    client.update_settings(&settings).await?;
    println!("Saved {} = {}", key, raw);
    Ok(())
}

async fn delete_note(client: &GatewayClient) -> Result<(), Box<dyn std::error::Error>> {
    let id = prompt("Note ID: ")?;
    if client.delete_note(&id).await? {
        println!("Deleted.");
    } else {
        println!("No note with that ID.");
    }
    Ok(())
}
