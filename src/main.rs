use folio_content::{Config, FluentRouter, PgContentStore, Result};
use std::{process::ExitCode, sync::Arc};

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            // No subscriber yet
            eprintln!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    config.setup_tracing();

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, kind = ?e.kind(), "Server stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> Result<()> {
    let store = Arc::new(PgContentStore::connect(&config.database).await?);

    // start() closes the store after draining
    FluentRouter::new(config, store)?
        .setup_middleware()
        .start()
        .await
}
