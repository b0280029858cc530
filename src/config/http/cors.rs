use {
    http::{HeaderName, HeaderValue, Method},
    serde::Deserialize,
    std::{str::FromStr, time::Duration},
    tower_http::cors::{AllowOrigin, Any, CorsLayer},
};

/// Configuration for Cross-Origin Resource Sharing (CORS).
///
/// Defaults allow any origin, the methods GET/POST/PUT/PATCH/DELETE/OPTIONS,
/// the headers Content-Type/Authorization/X-Requested-With and cache preflight
/// responses for 24 hours.
///
/// Credentials are only sent when `allowed_origins` lists explicit origins.
/// Browsers reject credentialed responses to a wildcard origin, and
/// `tower-http` refuses to build such a layer.
///
/// In TOML configuration:
/// ```toml
/// [http.cors]
/// allowed_origins = ["https://portfolio.example.com"]
/// allowed_methods = ["GET", "OPTIONS"]
/// max_age = "1h"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct HttpCorsConfig {
    /// Origins allowed to make CORS requests. `"*"` allows any origin.
    /// Filled from the comma separated `CORS_ORIGIN` variable.
    #[serde(default = "HttpCorsConfig::default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    #[serde(default = "HttpCorsConfig::default_allowed_methods")]
    pub allowed_methods: Vec<CorsMethod>,

    #[serde(default = "HttpCorsConfig::default_allowed_headers")]
    pub allowed_headers: Vec<CorsHeader>,

    /// Whether to allow credentials when the origins are explicit.
    #[serde(default = "HttpCorsConfig::default_allow_credentials")]
    pub allow_credentials: bool,

    /// How long browsers may cache preflight responses.
    #[serde(default = "HttpCorsConfig::default_max_age", with = "humantime_serde")]
    pub max_age: Duration,
}

impl HttpCorsConfig {
    fn default_allowed_origins() -> Vec<String> {
        vec!["*".into()]
    }

    fn default_allowed_methods() -> Vec<CorsMethod> {
        [
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ]
        .into_iter()
        .map(CorsMethod)
        .collect()
    }

    fn default_allowed_headers() -> Vec<CorsHeader> {
        [
            http::header::CONTENT_TYPE,
            http::header::AUTHORIZATION,
            HeaderName::from_static("x-requested-with"),
        ]
        .into_iter()
        .map(CorsHeader)
        .collect()
    }

    fn default_allow_credentials() -> bool {
        true
    }

    fn default_max_age() -> Duration {
        Duration::from_secs(24 * 60 * 60)
    }

    /// Sets the list of origins allowed to make CORS requests.
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.allowed_origins = origins;
        self
    }

    /// Sets the HTTP methods allowed in CORS requests.
    pub fn with_allowed_methods(mut self, methods: Vec<CorsMethod>) -> Self {
        self.allowed_methods = methods;
        self
    }

    /// Sets the maximum time browsers should cache CORS preflight responses.
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    /// True when any origin is allowed.
    pub fn is_wildcard(&self) -> bool {
        self.allowed_origins.is_empty() || self.allowed_origins.iter().any(|o| o.trim() == "*")
    }

    ///
    /// Builds the `CorsLayer` for this configuration.
    ///
    /// Origins that are not valid header values are skipped with a warning.
    ///
    pub fn to_layer(&self) -> CorsLayer {
        let methods: Vec<Method> = self.allowed_methods.iter().map(|m| m.0.clone()).collect();
        let headers: Vec<HeaderName> = self.allowed_headers.iter().map(|h| h.0.clone()).collect();

        let mut cors = CorsLayer::new()
            .allow_methods(methods)
            .allow_headers(headers)
            .max_age(self.max_age);

        if self.is_wildcard() {
            cors = cors.allow_origin(Any);
        } else {
            let origins: Vec<HeaderValue> = self
                .allowed_origins
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();
            cors = cors.allow_origin(AllowOrigin::list(origins));

            // Must be set last after origins/headers
            if self.allow_credentials {
                cors = cors.allow_credentials(true);
            }
        }

        cors
    }
}

impl Default for HttpCorsConfig {
    fn default() -> Self {
        HttpCorsConfig {
            allowed_origins: Self::default_allowed_origins(),
            allowed_methods: Self::default_allowed_methods(),
            allowed_headers: Self::default_allowed_headers(),
            allow_credentials: Self::default_allow_credentials(),
            max_age: Self::default_max_age(),
        }
    }
}

/// Wrapper type for HTTP methods in CORS configuration.
///
/// Enables deserialization of HTTP methods from strings in TOML.
#[derive(Debug, Clone)]
pub struct CorsMethod(pub Method);

impl<'de> Deserialize<'de> for CorsMethod {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let method = Method::from_str(&s).map_err(serde::de::Error::custom)?;
        Ok(CorsMethod(method))
    }
}

/// Wrapper type for HTTP header names in CORS configuration.
///
/// Header names are case-insensitive and validated on deserialization.
#[derive(Debug, Clone)]
pub struct CorsHeader(pub HeaderName);

impl<'de> Deserialize<'de> for CorsHeader {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let header = HeaderName::from_str(&s).map_err(serde::de::Error::custom)?;
        Ok(CorsHeader(header))
    }
}
