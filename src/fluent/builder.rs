//! Orchestration and router delegation: setup_middleware(), start(), route(), etc.

use super::router::FluentRouter;
use super::shutdown::{cancel_on_signal, drain_deadline};
use crate::{AppState, ContentStore, Result};

use {
    axum::{Router, body::Body, routing::Route},
    http::Request,
    std::convert::Infallible,
    tower::{Layer, Service},
};

impl<S: ContentStore> FluentRouter<S> {
    /// Sets up all routes and middleware layers in the correct order.
    ///
    /// Middleware is processed outside-in for requests and inside-out for
    /// responses. The **last layer added is the outermost layer** and
    /// executes **first** on incoming requests.
    ///
    /// The order (from innermost to outermost):
    /// 1. **Content routes** - `/api/{slug}`, with locale validation on translated sections
    /// 2. **Health** - `/health` liveness probe
    /// 3. **Fallbacks** - 404 and 405 failure envelopes
    /// 4. **Sanitize** - Strip script elements from query values
    /// 5. **Error funnel** - Log every failure, add details in development
    /// 6. **CORS** - Handle preflight & add headers
    /// 7. **Logging** - Trace span per request
    /// 8. **Request ID** - Generate/extract ID before the span opens
    /// 9. **Panic catching** - Catch ALL panics from inner layers (outermost)
    ///
    /// Middlewares other than the error funnel can be switched off with
    /// `[http.middleware] exclude = [...]`.
    #[must_use]
    pub fn setup_middleware(self) -> Self {
        const PACKAGE_NAME: &str = env!("CARGO_PKG_NAME");
        const VERSION: &str = env!("CARGO_PKG_VERSION");
        tracing::info!(
            environment = %self.config.environment,
            "Starting {PACKAGE_NAME} version {VERSION}..."
        );

        self.setup_content_routes() // 1. Content routes
            .setup_health() // 2. Liveness probe
            .setup_fallbacks() // 3. 404 / 405 envelopes (before any layer)
            .setup_sanitize() // 4. Query sanitation
            .setup_error_funnel() // 5. Error funnel
            .setup_cors() // 6. CORS handling
            .setup_logging() // 7. Request/response logging
            .setup_request_id() // 8. Request ID - early so all requests get IDs
            .setup_catch_panic() // 9. Outermost - panic recovery
    }

    /// Serves until shutdown, then closes the store.
    ///
    /// # Graceful Shutdown
    ///
    /// SIGINT, SIGTERM or cancelling [`FluentRouter::cancellation_token`]
    /// starts the shutdown:
    ///
    /// 1. The listener stops accepting connections
    /// 2. In-flight requests drain for at most `shutdown_timeout`
    /// 3. The store is closed, whether the drain finished or timed out
    ///
    /// The store is also closed when serving fails.
    pub async fn start(self) -> Result<()> {
        let bind_addr = self.config.http.full_bind_addr();
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
        tracing::info!("Server is running on http://{}", listener.local_addr()?);

        let shutdown_timeout = self.config.http.shutdown_timeout;
        let token = self.shutdown.clone();
        let store = self.store();
        let service = self.into_router();

        tokio::spawn(cancel_on_signal(token.clone()));
        let serve_future =
            axum::serve(listener, service).with_graceful_shutdown(token.clone().cancelled_owned());

        // The timeout only starts after shutdown begins
        let served: Result<()> = tokio::select! {
            result = serve_future => {
                tracing::info!("Graceful shutdown completed");
                result.map_err(Into::into)
            }
            _ = drain_deadline(token.clone(), shutdown_timeout) => {
                tracing::warn!(
                    timeout = %humantime::format_duration(shutdown_timeout),
                    "Graceful shutdown timeout expired, closing with requests in flight"
                );
                Ok(())
            }
        };

        // Also releases the signal listener when serving failed
        token.cancel();
        store.close().await;
        served
    }

    /// Adds a custom Tower middleware layer to the router.
    ///
    /// Forwards to `axum::Router::layer()`.
    pub fn layer<L>(mut self, layer: L) -> Self
    where
        L: Layer<Route> + Clone + Send + Sync + 'static,
        L::Service: Service<Request<Body>> + Clone + Send + Sync + 'static,
        <L::Service as Service<Request<Body>>>::Response: axum::response::IntoResponse + 'static,
        <L::Service as Service<Request<Body>>>::Error: Into<Infallible> + 'static,
        <L::Service as Service<Request<Body>>>::Future: Send + 'static,
    {
        self.inner = self.inner.layer(layer);
        self
    }

    /// Adds an extra route sharing the content state.
    pub fn route(mut self, path: &str, route: axum::routing::MethodRouter<AppState<S>>) -> Self {
        self.inner = self.inner.route(path, route);
        self
    }

    /// Returns the finished `axum::Router` with its state applied.
    ///
    /// Used by [`FluentRouter::start`] and by in-process tests.
    pub fn into_router(self) -> Router {
        self.inner.with_state(self.state)
    }

    /// Returns the underlying router, still expecting its state.
    pub fn into_inner(self) -> Router<AppState<S>> {
        self.inner
    }
}
