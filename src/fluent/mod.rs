//! FluentRouter and middleware configuration.
//!
//! - [`router`] - Core `FluentRouter` struct and initialization
//! - [`features`] - Content routes, health probe, fallbacks, CORS
//! - [`request`] - Request id, query sanitation, locale validation
//! - [`observability`] - Request tracing and the error funnel
//! - [`control`] - Panic catching
//! - [`builder`] - Orchestration (setup_middleware, start, router delegation)
//! - [`shutdown`] - Signal handling and the drain deadline

mod builder;
mod control;
mod features;
mod observability;
mod request;
mod router;
mod shutdown;

pub use features::HEALTH_ROUTE;
pub use request::{sanitize_query, validate_locale};
pub use router::FluentRouter;

#[cfg(test)]
mod tests;
