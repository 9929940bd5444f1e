use std::sync::Arc;

use anyhow::Context;
use bookshelf_db::MemoryStore;
use bookshelf_kernel::{settings::Settings, InitCtx};
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "bookshelf", about = "Book and author catalog service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve {
        /// Override the configured listen port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print the merged OpenAPI document
    Openapi {
        #[arg(long)]
        pretty: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut settings = Settings::load().with_context(|| "failed to load bookshelf settings")?;

    match cli.command {
        Command::Serve { port } => {
            bookshelf_telemetry::init(&settings.telemetry);
            if let Some(port) = port {
                settings.server.port = port;
            }
            serve(&settings).await
        }
        Command::Openapi { pretty } => {
            let registry = bookshelf_app::build_registry(&settings, Arc::new(MemoryStore::new()));
            let spec = bookshelf_http::router::merged_openapi(&registry);
            let rendered = if pretty {
                serde_json::to_string_pretty(&spec)?
            } else {
                serde_json::to_string(&spec)?
            };
            println!("{}", rendered);
            Ok(())
        }
    }
}

async fn serve(settings: &Settings) -> anyhow::Result<()> {
    let registry = bookshelf_app::build_registry(settings, Arc::new(MemoryStore::new()));
    let ctx = InitCtx { settings };

    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;
    tracing::info!(port = settings.server.port, "bookshelf CLI serving");

    let served = bookshelf_http::start_server(&registry, settings).await;
    registry.stop_modules().await?;
    served
}
