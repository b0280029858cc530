//! Routing features: content routes, health probe, fallbacks and CORS.

use super::router::FluentRouter;

use {
    crate::{ContentStore, Error, HttpMiddleware, Section, SuccessEnvelope, controller},
    axum::{
        Json,
        http::{Method, Uri},
        routing::get,
    },
    serde_json::json,
};

/// Path of the liveness probe.
pub const HEALTH_ROUTE: &str = "/health";

impl<S: ContentStore> FluentRouter<S> {
    /// Mounts `GET /api/{slug}` for every section.
    #[must_use]
    pub fn setup_content_routes(mut self) -> Self {
        for section in Section::ALL {
            self.inner = self
                .inner
                .route(&section.path(), controller::content_route::<S>(section));
        }
        self
    }

    /// Adds the `/health` liveness probe.
    ///
    /// Always answers with a success envelope and never touches the store, so
    /// an unreachable store does not get the process restarted.
    #[must_use]
    pub fn setup_health(mut self) -> Self {
        self.inner = self.inner.route(
            HEALTH_ROUTE,
            get(|| async {
                Json(SuccessEnvelope::new(
                    "Server is healthy",
                    json!({ "status": "ok" }),
                ))
            }),
        );
        self
    }

    ///
    /// Renders unknown paths as 404 and known paths with the wrong method as
    /// 405, both in the failure envelope.
    ///
    /// Must be called before any `layer` so the middlewares wrap the
    /// fallbacks too.
    ///
    #[must_use]
    pub fn setup_fallbacks(mut self) -> Self {
        self.inner = self
            .inner
            .fallback(|uri: Uri| async move { route_not_found(&uri) })
            .method_not_allowed_fallback(|method: Method, uri: Uri| async move {
                Error::method_not_allowed(format!(
                    "Method {method} is not allowed on {}",
                    uri.path()
                ))
            });
        self
    }

    /// Sets up CORS headers and preflight handling from `[http.cors]`.
    #[must_use]
    pub fn setup_cors(mut self) -> Self {
        if !self.is_middleware_enabled(HttpMiddleware::Cors) {
            return self;
        }

        let cors = &self.config.http.cors;
        if cors.is_wildcard() && cors.allow_credentials {
            tracing::debug!("CORS allows any origin, credentials are not sent");
        }
        self.inner = self.inner.layer(cors.to_layer());
        self
    }
}

fn route_not_found(uri: &Uri) -> Error {
    let target = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    Error::not_found(format!("Can't find {target} on this server!"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_not_found_keeps_query() {
        let uri: Uri = "/api/nope?locale=en".parse().unwrap();
        assert_eq!(
            route_not_found(&uri).to_string(),
            "Can't find /api/nope?locale=en on this server!"
        );
    }
}
