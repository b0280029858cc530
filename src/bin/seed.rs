//! Loads `<section>.json` files into the document store.
//!
//! ```text
//! seed [DIR]
//! ```
//!
//! The directory defaults to `SEED_DIR`, then `data`. Every section with a
//! file has its collection replaced; other sections are left alone.

use folio_content::{
    Config, PgContentStore, Result,
    seed::{DEFAULT_SEED_DIR, load_seed_dir, seed_store},
};
use std::{env, path::PathBuf, process::ExitCode};

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    config.setup_tracing();

    let dir = env::args()
        .nth(1)
        .or_else(|| env::var("SEED_DIR").ok())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SEED_DIR));

    match run(&config, dir).await {
        Ok(inserted) => {
            tracing::info!(inserted, "Seeding completed");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, kind = ?e.kind(), "Seeding failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &Config, dir: PathBuf) -> Result<usize> {
    // Validate everything before connecting
    let files = load_seed_dir(&dir)?;
    tracing::info!(dir = %dir.display(), files = files.len(), "Loaded seed files");

    let store = PgContentStore::connect(&config.database).await?;
    let seeded = seed_store(&store, &files).await;
    store.disconnect().await;
    seeded
}
