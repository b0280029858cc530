//! # folio-content
//!
//! Content backend for a personal portfolio site.
//!
//! Sections (intro, about, experience, projects, ...) are stored as JSON
//! documents keyed by locale and served read-only under `/api/{section}`.
//! Translated sections take a `locale` query parameter (`en` or `en-US`)
//! and fall back to the document's default language, then to `en-US`.
//! Social links and icons are served as plain collections.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use folio_content::{Config, FluentRouter, PgContentStore, Result};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::from_env()?;
//!     config.setup_tracing();
//!
//!     let store = Arc::new(PgContentStore::connect(&config.database).await?);
//!     FluentRouter::new(config, store)?
//!         .setup_middleware()
//!         .start()
//!         .await
//!     // The store is closed once the server has drained
//! }
//! ```
//!
//! # Responses
//!
//! ```json
//! { "success": true, "message": "About content retrieved successfully", "data": { ... } }
//! { "success": false, "status": "fail", "message": "Locale parameter is required" }
//! ```
//!
//! Client errors report `"fail"`, server errors `"error"`. Server error
//! messages are generic; the cause is logged and, in development only,
//! returned as `details`.
//!
//! # Configuration
//!
//! Read from the environment (`.env` files are honored by the binaries):
//!
//! | Variable | Default |
//! |---|---|
//! | `PORT` / `HOST` | `3000` / `0.0.0.0` |
//! | `NODE_ENV` | `development` |
//! | `CORS_ORIGIN` | `*` |
//! | `LOG_FORMAT` | `default` |
//! | `SHUTDOWN_TIMEOUT` | `30s` |
//! | `DATABASE_USER`, `DATABASE_PASSWORD`, `DATABASE_CLUSTER`, `DATABASE_NAME` | required |
//! | `DATABASE_MAX_POOL_SIZE` | `5` |
//!
//! Set `CONFIG_FILE` to load a TOML file instead; `{{ VAR }}` placeholders in
//! it are replaced with environment variables.

mod config;
mod content;
mod controller;
mod error;
mod fluent;
mod locale;
mod store;
mod utils;

pub mod seed;

pub use config::*;
pub use content::*;
pub use controller::*;
pub use error::*;
pub use fluent::*;
pub use locale::*;
pub use store::*;
pub use utils::*;

pub type Result<T> = std::result::Result<T, Error>;
