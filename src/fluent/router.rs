//! Core FluentRouter struct and initialization methods.

use {
    crate::{AppState, Config, ContentStore, HttpMiddleware, Result},
    axum::Router,
    std::sync::Arc,
    tokio_util::sync::CancellationToken,
};

/// Fluent builder for the content service router.
///
/// Holds the configuration, the shared store handle and the `axum::Router`
/// being assembled. Routes and middleware are added through dedicated
/// `setup_*` methods; [`FluentRouter::setup_middleware`] calls all of them in
/// the right order.
///
/// ```rust,no_run
/// use folio_content::{Config, FluentRouter, PgContentStore};
/// use std::sync::Arc;
///
/// # async fn example() -> folio_content::Result<()> {
/// let config = Config::from_env()?;
/// let store = Arc::new(PgContentStore::connect(&config.database).await?);
///
/// // Serves until SIGINT / SIGTERM, then drains and closes the store
/// FluentRouter::new(config, store)?
///     .setup_middleware()
///     .start()
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct FluentRouter<S> {
    pub(crate) config: Config,
    pub(crate) state: AppState<S>,
    pub(crate) inner: Router<AppState<S>>,
    pub(crate) panic_channel: Option<tokio::sync::mpsc::Sender<String>>,
    pub(crate) shutdown: CancellationToken,
}

impl<S: ContentStore> FluentRouter<S> {
    /// Creates a new `FluentRouter` with the provided configuration and store.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the HTTP or logging section is
    /// invalid. Store credentials are not checked here; the store already
    /// exists by the time the router is built.
    pub fn new(config: Config, store: Arc<S>) -> Result<Self> {
        config.http.validate()?;
        config.logging.validate()?;

        let state = AppState::new(store, config.environment);
        Ok(FluentRouter {
            config,
            state,
            inner: Router::new(),
            panic_channel: None,
            shutdown: CancellationToken::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The shared store handle.
    pub fn store(&self) -> Arc<S> {
        Arc::clone(&self.state.store)
    }

    /// Returns the token that stops the server.
    ///
    /// Cancelling it has the same effect as SIGTERM: [`FluentRouter::start`]
    /// drains in-flight requests, closes the store and returns.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Helper method to check if a middleware is enabled in the configuration.
    pub(crate) fn is_middleware_enabled(&self, middleware: HttpMiddleware) -> bool {
        self.config.http.is_middleware_enabled(middleware)
    }

    /// Sets a notification channel for panic messages.
    ///
    /// When configured, any panics caught by the panic handler middleware will
    /// send a message to this channel.
    ///
    /// ```rust,no_run
    /// # use folio_content::{Config, FluentRouter, MemoryStore};
    /// # use std::sync::Arc;
    /// # fn example() -> folio_content::Result<()> {
    /// let (tx, mut rx) = tokio::sync::mpsc::channel(100);
    ///
    /// let router = FluentRouter::new(Config::default(), Arc::new(MemoryStore::new()))?
    ///     .with_panic_notification_channel(tx);
    ///
    /// tokio::spawn(async move {
    ///     while let Some(panic_msg) = rx.recv().await {
    ///         eprintln!("Panic caught: {}", panic_msg);
    ///     }
    /// });
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn with_panic_notification_channel(self, ch: tokio::sync::mpsc::Sender<String>) -> Self {
        Self {
            panic_channel: Some(ch),
            ..self
        }
    }
}
