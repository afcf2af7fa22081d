use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Result;
use notes_sync::{LocalDraftStore, SyncConfig, SyncController};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, Mutex};
use tracing_subscriber::EnvFilter;

mod api;
mod app;
mod config;
mod prompt;
mod storage;
mod ui;

use api::ApiClient;
use app::{App, Command, History};
use config::ClientConfig;
use prompt::{InputLines, TerminalConfirm};
use storage::FileStore;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("notes_sync=info,notes_cli=info")),
        )
        .with_writer(io::stderr)
        .init();

    // Parse CLI arguments
    let args: Vec<String> = std::env::args().collect();
    let mut start_path = "/".to_string();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--open" => {
                if i + 1 < args.len() {
                    start_path = format!("/documents/{}", args[i + 1]);
                    i += 2;
                } else {
                    eprintln!("Error: --open requires a document id");
                    std::process::exit(1);
                }
            }
            "--help" | "-h" => {
                println!("Usage: notes [OPTIONS]");
                println!();
                println!("Options:");
                println!("  --open <ID>  Open a document on startup");
                println!("  --help, -h   Show this help message");
                println!();
                println!("{}", app::HELP);
                return Ok(());
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                std::process::exit(1);
            }
        }
    }

    let config = ClientConfig::from_env()?;
    let sync_config = SyncConfig::from_env()?;
    tracing::debug!(?config, ?sync_config, "configuration loaded");

    // Spawn input handler
    let (tx, rx) = mpsc::channel::<String>(100);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if tx.send(line).await.is_err() {
                break;
            }
        }
    });
    let input: InputLines = Arc::new(Mutex::new(rx));

    let drafts = Arc::new(FileStore::new(&config.draft_dir));
    tracing::debug!(dir = %drafts.dir().display(), "draft directory");

    let history = Arc::new(History::new(&start_path));
    let controller = SyncController::new(
        Arc::new(ApiClient::new(&config.server_url, config.username.clone())),
        LocalDraftStore::new(drafts),
        Arc::new(TerminalConfirm::new(config.restore_drafts, input.clone())),
        history.clone(),
        sync_config,
    );
    ui::attach(&controller.store());

    let mut app = App::new(controller, history);
    app.controller().start(&start_path).await;

    run_app(&mut app, input).await
}

async fn run_app(app: &mut App, input: InputLines) -> Result<()> {
    loop {
        print!("{}> ", app.location());
        io::stdout().flush()?;

        let line = input.lock().await.recv().await;
        let Some(line) = line else {
            // stdin closed
            app.flush().await;
            return Ok(());
        };

        match line.parse::<Command>() {
            Ok(command) => match app.execute(command).await {
                Ok(true) => return Ok(()),
                Ok(false) => {}
                Err(e) => eprintln!("Error: {}", e),
            },
            Err(e) => eprintln!("{}", e),
        }
    }
}
