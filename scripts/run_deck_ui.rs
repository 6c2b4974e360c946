use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use taskdeck_core::{init_logging, load_env, EventRouter, FileKvStore, TaskStore};
use taskdeck_provider_agent::AgentClient;
use taskdeck_terminal::{render_panel, PanelConfig, TaskPanel};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser, Debug)]
struct Cli {
    /// Agent backend base URL
    #[arg(long, env = "TASKDECK_BACKEND_URL", default_value = "http://127.0.0.1:8000")]
    backend_url: String,

    /// Directory holding the persisted task panel state
    #[arg(long, env = "TASKDECK_DATA_DIR", default_value = ".taskdeck")]
    data_dir: String,

    #[arg(long, env = "TASKDECK_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Disable live panel re-rendering on task updates
    #[arg(long)]
    no_panel: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_env().ok();
    let cli = Cli::parse();
    std::env::set_var("TASKDECK_LOG_LEVEL", &cli.log_level);
    init_logging();

    let storage = Arc::new(
        FileKvStore::new(&cli.data_dir)
            .with_context(|| format!("failed to open data directory {}", cli.data_dir))?,
    );
    let store = TaskStore::with_storage(storage);

    let mut router = EventRouter::new();
    let sink = store.clone();
    router.add_task_sink(move |event| sink.apply(event));

    let panel = TaskPanel::new(
        PanelConfig {
            enabled: !cli.no_panel,
        },
        store.clone(),
    );
    let panel_handle = panel.start().await?;

    let client = AgentClient::new(cli.backend_url.clone());
    tracing::info!(
        "Session {} ready against {}",
        client.session_id(),
        cli.backend_url
    );

    println!("taskdeck — type a message, or /tasks, /delete <id>, /clear-done, /clear-all, /quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input {
            "/quit" => break,
            "/tasks" => println!("{}", render_panel(&store.snapshot())),
            "/clear-done" => {
                let removed = store.clear_terminal();
                println!("removed {} finished task(s)", removed);
            }
            "/clear-all" => {
                store.clear_all();
                println!("cleared all tasks");
            }
            _ => {
                if let Some(task_id) = input.strip_prefix("/delete ") {
                    let task_id = task_id.trim();
                    if store.delete(task_id) {
                        println!("deleted {}", task_id);
                    } else {
                        println!("no task with id {}", task_id);
                    }
                } else if input.starts_with('/') {
                    println!("unknown command: {}", input);
                } else {
                    // A chat turn; task events stream into the store while
                    // the reply assembles.
                    match client.send_chat(input, &mut router).await {
                        Ok(reply) => println!("{}", reply),
                        Err(e) => tracing::error!("Chat turn failed: {}", e),
                    }
                }
            }
        }
    }

    if let Some(handle) = panel_handle {
        handle.abort();
    }
    Ok(())
}
