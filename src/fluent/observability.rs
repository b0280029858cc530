//! Observability: request tracing and the error funnel.

use super::router::FluentRouter;

use {
    crate::{
        ContentStore, Environment, ErrorReport, ErrorResponse, HttpMiddleware,
        error::status_label, utils::rfc3339_now,
    },
    axum::{
        body::Body,
        extract::{Request, State},
        http::header,
        middleware::{self, Next},
        response::Response,
    },
    tower_http::trace::TraceLayer,
};

impl<S: ContentStore> FluentRouter<S> {
    /// Sets up request/response logging with distributed tracing support.
    ///
    /// Opens an `http_request` span per request carrying the method, uri and
    /// request id. Output format is controlled by `logging.format`.
    #[must_use]
    pub fn setup_logging(mut self) -> Self {
        if !self.is_middleware_enabled(HttpMiddleware::Logging) {
            return self;
        }

        self.inner = self
            .inner
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .headers()
                        .get("x-request-id")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("unknown");

                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id,
                    )
                }),
            );

        self
    }

    ///
    /// Installs the error funnel.
    ///
    /// Every failure response produced further in (handlers, locale
    /// validation, fallbacks) passes through here. The funnel logs the full
    /// diagnostic and, in development, adds it to the envelope as `details`.
    /// It cannot be disabled.
    ///
    #[must_use]
    pub fn setup_error_funnel(mut self) -> Self {
        let environment = self.config.environment;
        self.inner = self
            .inner
            .layer(middleware::from_fn_with_state(environment, error_funnel));
        self
    }
}

async fn error_funnel(
    State(environment): State<Environment>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let mut response = next.run(request).await;
    let Some(report) = response.extensions_mut().remove::<ErrorReport>() else {
        return response;
    };

    let timestamp = rfc3339_now();
    if report.status.is_server_error() {
        tracing::error!(
            error = %report.message,
            kind = ?report.kind,
            status = report.status.as_u16(),
            %method,
            %path,
            %timestamp,
            "Request failed"
        );
    } else {
        tracing::warn!(
            error = %report.message,
            kind = ?report.kind,
            status = report.status.as_u16(),
            %method,
            %path,
            %timestamp,
            "Request rejected"
        );
    }

    if environment.is_development() {
        return with_details(response, &report);
    }
    response
}

/// Replaces the body of an error response with an envelope that carries the
/// internal message. Headers and status are kept.
fn with_details(response: Response, report: &ErrorReport) -> Response {
    let envelope = ErrorResponse::new(status_label(report.status), &report.public_message)
        .with_details(&report.message);

    match serde_json::to_vec(&envelope) {
        Ok(bytes) => {
            let (mut parts, _) = response.into_parts();
            parts.headers.remove(header::CONTENT_LENGTH);
            Response::from_parts(parts, Body::from(bytes))
        }
        Err(e) => {
            tracing::error!(error = %e, "Could not serialize error details");
            response
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use axum::response::IntoResponse;

    #[tokio::test]
    async fn test_with_details_keeps_status_and_adds_message() {
        let err = Error::upstream("connection refused");
        let report = ErrorReport::from(&err);
        let response = with_details(err.into_response(), &report);
        assert_eq!(response.status(), 500);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "An error occurred while fetching data");
        assert_eq!(json["details"], "connection refused");
    }
}
