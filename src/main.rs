mod common;
mod config;
mod format;
mod network;
mod storage;
mod ui;
mod widget;

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use dotenvy::dotenv;
use network::{ApiClient, ChatWorker};
use storage::KvDatabase;
use tokio::sync::mpsc;
use ui::ChatApp;
use widget::{ChatWidget, WidgetOptions};

#[derive(Parser)]
#[command(
    name = "stream_chat_widget",
    version,
    about = "Desktop chat client with streamed AI replies"
)]
struct Cli {
    /// Path to JSON config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH, value_name = "FILE")]
    config: String,
    /// Chat server base URL (overrides the config file)
    #[arg(long, env = "CHAT_SERVER_URL", value_name = "URL")]
    server: Option<String>,
    /// Use the single-response endpoint instead of streaming
    #[arg(long)]
    no_stream: bool,
    /// Local SQLite file used for the history cache and preferences
    #[arg(long, value_name = "FILE")]
    database: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let mut app_config = config::load_config(&cli.config);
    if let Some(server) = cli.server {
        app_config.server_url = server;
    }
    if let Some(database) = cli.database {
        app_config.database_path = database;
    }
    if cli.no_stream {
        app_config.streaming = false;
    }

    storage::ensure_data_dir(&app_config.database_path)?;
    let store =
        KvDatabase::open(&app_config.database_path)?.with_quota(app_config.storage_quota_bytes);
    let backend = ApiClient::new(&app_config.server_url)?;
    let widget = ChatWidget::new(backend, store, WidgetOptions {
        default_role: app_config.default_role.clone(),
        streaming: app_config.streaming,
    });

    // UI -> worker
    let (cmd_tx, cmd_rx) = mpsc::channel(100);
    // Worker -> UI; streamed deltas arrive in bursts
    let (event_tx, event_rx) = mpsc::channel(512);

    log::info!(
        "Connecting to {} (streaming={})",
        app_config.server_url,
        app_config.streaming
    );
    tokio::spawn(ChatWorker::new(widget, event_tx, cmd_rx).run());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("AI Chat Assistant")
            .with_inner_size([480.0, 720.0]),
        ..Default::default()
    };
    let mut event_rx = Some(event_rx);

    let result = eframe::run_native(
        "AI Chat Assistant",
        options,
        Box::new(move |cc| {
            let event_receiver = event_rx
                .take()
                .ok_or("ChatApp should only be initialized once")?;
            Ok(Box::new(ChatApp::new(
                cc,
                app_config.clone(),
                cmd_tx.clone(),
                event_receiver,
            )))
        }),
    );
    if let Err(err) = result {
        log::error!("UI terminated: {err}");
        return Err(err.into());
    }
    Ok(())
}
