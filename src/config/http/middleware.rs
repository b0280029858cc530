use serde::Deserialize;

///
/// Selects which optional middlewares run.
///
/// ```toml
/// [http.middleware]
/// exclude = ["cors", "sanitize"]
/// ```
///
/// The error funnel is not listed here and always runs.
///
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMiddlewareConfig {
    Include(Vec<HttpMiddleware>),
    Exclude(Vec<HttpMiddleware>),
}

impl HttpMiddlewareConfig {
    pub fn is_enabled(&self, middleware: HttpMiddleware) -> bool {
        match self {
            HttpMiddlewareConfig::Include(list) => list.contains(&middleware),
            HttpMiddlewareConfig::Exclude(list) => !list.contains(&middleware),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum HttpMiddleware {
    RequestId,
    Sanitize,
    Cors,
    Logging,
    CatchPanic,
}
