use std::sync::Arc;

use anyhow::Context;
use bookshelf_db::MemoryStore;
use bookshelf_kernel::{settings::Settings, InitCtx};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load bookshelf settings")?;
    bookshelf_telemetry::init(&settings.telemetry);

    tracing::info!(
        env = ?settings.environment,
        books_table = %settings.database.books_table,
        authors_table = %settings.database.authors_table,
        "bookshelf-app bootstrap starting"
    );

    let registry = bookshelf_app::build_registry(&settings, Arc::new(MemoryStore::new()));
    let ctx = InitCtx {
        settings: &settings,
    };
    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;

    tracing::info!("bookshelf-app bootstrap complete");

    let served = bookshelf_http::start_server(&registry, &settings).await;
    registry.stop_modules().await?;
    served
}
