mod api;
mod config;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use pageforge_generator::{HtmlGenerator, OpenAiBackend};
use pageforge_store::ConversationStore;

use api::AppState;
use config::Config;

#[derive(Parser)]
#[command(name = "pageforge")]
#[command(about = "PageForge — prompt-driven HTML generation server")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the PageForge HTTP server
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Show current server status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();

    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port } => {
            let config = Config {
                port: port.unwrap_or(config.port),
                ..config
            };
            run_server(config).await?;
        }
        Commands::Status => {
            let client = reqwest::Client::new();
            match client
                .get(format!("http://localhost:{}/api/health", config.port))
                .send()
                .await
            {
                Ok(resp) => {
                    let body: serde_json::Value = resp.json().await?;
                    println!("{}", serde_json::to_string_pretty(&body)?);
                }
                Err(_) => {
                    println!("PageForge is not running on port {}", config.port);
                }
            }
        }
    }

    Ok(())
}

async fn run_server(config: Config) -> Result<()> {
    info!(
        port = config.port,
        bind = %config.bind_address,
        chat_model = %config.chat_model,
        image_model = %config.image_model,
        "Starting PageForge server"
    );

    let api_key = config
        .api_key
        .clone()
        .context("OPENAI_API_KEY must be set to serve generation requests")?;

    let mut backend = OpenAiBackend::new(
        api_key,
        config.chat_model.as_str(),
        config.image_model.as_str(),
    );
    if let Some(base_url) = &config.api_base_url {
        backend = backend.with_base_url(base_url.as_str());
        info!(base_url = %base_url, "Using custom API base URL");
    }

    let app_state = Arc::new(AppState {
        store: ConversationStore::new(),
        generator: HtmlGenerator::new(Arc::new(backend)),
    });

    let app = api::build_router(app_state).layer(CorsLayer::permissive());
    let addr = format!("{}:{}", config.bind_address, config.port);

    info!(addr = %addr, "HTTP API listening");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
