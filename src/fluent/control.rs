//! Panic recovery.

use super::router::FluentRouter;

use {
    crate::{ContentStore, ErrorResponse, HttpMiddleware},
    axum::{
        Json,
        http::StatusCode,
        response::{IntoResponse, Response},
    },
    tower_http::catch_panic::CatchPanicLayer,
};

impl<S: ContentStore> FluentRouter<S> {
    /// Sets up panic catching middleware.
    ///
    /// When a handler panics:
    /// 1. Panic is caught before it crashes the server
    /// 2. Client receives the 500 failure envelope
    /// 3. Panic message is sent to notification channel (if configured)
    /// 4. Server continues running
    ///
    /// The panic message is only added to the envelope in development.
    #[must_use]
    pub fn setup_catch_panic(mut self) -> Self {
        if !self.is_middleware_enabled(HttpMiddleware::CatchPanic) {
            return self;
        }

        let panic_channel = self.panic_channel.clone();
        let development = self.config.environment.is_development();
        self.inner = self.inner.layer(CatchPanicLayer::custom(
            move |err: Box<dyn std::any::Any + Send + 'static>| -> Response {
                let msg = if let Some(s) = err.downcast_ref::<String>() {
                    format!("Service panicked: {}", s)
                } else if let Some(s) = err.downcast_ref::<&str>() {
                    format!("Service panicked: {}", s)
                } else {
                    "`CatchPanic` was unable to downcast the panic info".to_string()
                };

                tracing::error!(timestamp = %crate::utils::rfc3339_now(), "{}", msg);
                if let Some(ch) = &panic_channel {
                    ch.try_send(msg.clone()).ok();
                }

                let mut envelope = ErrorResponse::new("error", "Something went wrong!");
                if development {
                    envelope = envelope.with_details(msg);
                }
                (StatusCode::INTERNAL_SERVER_ERROR, Json(envelope)).into_response()
            },
        ));
        self
    }
}
