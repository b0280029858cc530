//! Request handling: request ids, query sanitation and locale validation.

use super::router::FluentRouter;

use {
    crate::{ContentStore, HttpMiddleware, Locale, Result, utils::RequestIdGenerator},
    axum::{
        extract::Request,
        http::{HeaderName, Uri, uri::PathAndQuery},
        middleware::{self, Next},
        response::Response,
    },
    regex::Regex,
    std::{borrow::Cow, sync::LazyLock},
    tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    url::form_urlencoded,
};

/// Matches a complete `<script ...>...</script>` element, across lines.
static SCRIPT_TAG_REGEXP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b.*?</script\s*>").unwrap());

impl<S: ContentStore> FluentRouter<S> {
    /// Sets up request ID generation and propagation.
    ///
    /// 1. Generates or preserves `x-request-id` headers
    /// 2. Propagates the request ID to response headers
    ///
    /// If a request already has an `x-request-id` header, it is preserved.
    /// Otherwise a UUIDv7 is generated.
    #[must_use]
    pub fn setup_request_id(mut self) -> Self {
        if !self.is_middleware_enabled(HttpMiddleware::RequestId) {
            return self;
        }

        let x_request_id = HeaderName::from_static("x-request-id");
        self.inner = self
            .inner
            // Propagate sits inside Set so generated ids reach the response
            .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
            .layer(SetRequestIdLayer::new(x_request_id, RequestIdGenerator));
        self
    }

    /// Strips `<script>` elements from query string values before routing
    /// middleware and handlers see them.
    #[must_use]
    pub fn setup_sanitize(mut self) -> Self {
        if !self.is_middleware_enabled(HttpMiddleware::Sanitize) {
            return self;
        }

        self.inner = self.inner.layer(middleware::from_fn(sanitize_request));
        self
    }
}

async fn sanitize_request(mut request: Request, next: Next) -> Response {
    if let Some(query) = request.uri().query()
        && let Some(clean) = sanitize_query(query)
    {
        match with_query(request.uri(), &clean) {
            Some(uri) => {
                tracing::debug!("Removed script content from query string");
                *request.uri_mut() = uri;
            }
            None => tracing::warn!("Could not rebuild sanitized request URI"),
        }
    }
    next.run(request).await
}

///
/// Returns the re-encoded query with script elements removed from every
/// value, or `None` when nothing had to be removed.
///
pub fn sanitize_query(query: &str) -> Option<String> {
    let mut changed = false;
    let pairs: Vec<(Cow<str>, Cow<str>)> = form_urlencoded::parse(query.as_bytes())
        .map(|(key, value)| {
            let clean = match SCRIPT_TAG_REGEXP.replace_all(&value, "") {
                Cow::Borrowed(_) => value,
                Cow::Owned(stripped) => {
                    changed = true;
                    Cow::Owned(stripped)
                }
            };
            (key, clean)
        })
        .collect();

    if !changed {
        return None;
    }

    Some(
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish(),
    )
}

fn with_query(uri: &Uri, query: &str) -> Option<Uri> {
    let path_and_query = if query.is_empty() {
        uri.path().to_string()
    } else {
        format!("{}?{}", uri.path(), query)
    };

    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(PathAndQuery::try_from(path_and_query).ok()?);
    Uri::from_parts(parts).ok()
}

///
/// Route middleware for translated content.
///
/// Reads the `locale` query parameter, validates and normalizes it, and
/// stores the resulting [`Locale`] in the request extensions. Invalid or
/// missing locales are rejected here, before the handler touches the store.
///
pub async fn validate_locale(mut request: Request, next: Next) -> Result<Response> {
    let raw = request.uri().query().and_then(|query| {
        form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == "locale")
            .map(|(_, value)| value.into_owned())
    });

    let locale = Locale::parse(raw.as_deref())?;
    request.extensions_mut().insert(locale);
    Ok(next.run(request).await)
}
