//!
//! Configuration structures and loading.
//!
//! A configuration can be created in three ways:
//! - From the process environment via `Config::from_env` (the default for the
//!   binaries; `.env` files are loaded beforehand with `dotenvy`)
//! - From a TOML file via `Config::from_toml_file`, used when `CONFIG_FILE` is set
//! - From a TOML string via `str::parse::<Config>()`, mostly in tests
//!
//! In both TOML-based methods, environment variables can be referenced using
//! the `{{ VAR_NAME }}` syntax so credentials never live in the file itself.
//!
//! Configuration is split into sections:
//!
//! - `Environment` for the development/production switch
//! - `HttpConfig` for the HTTP server, CORS and middleware toggles
//! - `DatabaseConfig` for the document store credentials and pool
//! - `LoggingConfig` for the tracing output format
//!
mod database;
mod environment;
mod http;
mod logging;

pub use database::*;
pub use environment::*;
pub use http::*;
pub use logging::*;

use {
    crate::{Error, Result, utils::replace_handlebars_with_env},
    serde::Deserialize,
    std::{env, fs, path::Path, str::FromStr, time::Duration},
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    ///
    /// Loads and validates the configuration from the process environment.
    ///
    /// Fails with a configuration error naming every missing store credential.
    ///
    pub fn from_env() -> Result<Config> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    ///
    /// Loads the configuration from `CONFIG_FILE` when set, from the process
    /// environment otherwise.
    ///
    pub fn load() -> Result<Config> {
        match env::var("CONFIG_FILE") {
            Ok(path) if !path.trim().is_empty() => Self::from_toml_file(path.trim()),
            _ => Self::from_env(),
        }
    }

    ///
    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Empty values count as absent. Unset optional keys keep their defaults.
    ///
    pub fn from_lookup<F>(lookup: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Config::default();

        if let Some(env_name) = get("NODE_ENV") {
            config.environment = Environment::from_name(&env_name);
        }
        if let Some(host) = get("HOST") {
            config.http.bind_addr = host;
        }
        if let Some(port) = get("PORT") {
            config.http.bind_port = port
                .parse()
                .map_err(|_| Error::config(format!("PORT must be a port number, got '{port}'")))?;
        }
        if let Some(origins) = get("CORS_ORIGIN") {
            config.http.cors.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(timeout) = get("SHUTDOWN_TIMEOUT") {
            config.http.shutdown_timeout = parse_duration("SHUTDOWN_TIMEOUT", &timeout)?;
        }
        if let Some(format) = get("LOG_FORMAT") {
            config.logging.format = format.parse()?;
        }

        config.database.user = get(DatabaseConfig::USER_VAR).unwrap_or_default();
        config.database.password =
            crate::Sensitive(get(DatabaseConfig::PASSWORD_VAR).unwrap_or_default());
        config.database.cluster = get(DatabaseConfig::CLUSTER_VAR).unwrap_or_default();
        config.database.name = get(DatabaseConfig::NAME_VAR).unwrap_or_default();
        if let Some(size) = get("DATABASE_MAX_POOL_SIZE") {
            config.database.max_pool_size = size.parse().map_err(|_| {
                Error::config(format!("DATABASE_MAX_POOL_SIZE must be a number, got '{size}'"))
            })?;
        }
        if let Some(timeout) = get("DATABASE_ACQUIRE_TIMEOUT") {
            config.database.acquire_timeout = parse_duration("DATABASE_ACQUIRE_TIMEOUT", &timeout)?;
        }

        config.validate()?;
        Ok(config)
    }

    ///
    /// Loads a TOML file, substitutes environment variables, and validates
    /// the result.
    ///
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Config> {
        let text = fs::read_to_string(path)?;
        let config: Config = text.parse()?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the environment.
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Sets the HTTP server bind address of the HttpConfig.
    pub fn with_bind_addr<S: AsRef<str>>(mut self, addr: S) -> Self {
        self.http.bind_addr = addr.as_ref().into();
        self
    }

    /// Sets the HTTP server bind port of the HttpConfig.
    pub fn with_bind_port(mut self, port: u16) -> Self {
        self.http.bind_port = port;
        self
    }

    /// Sets the CORS configuration of the HttpConfig.
    pub fn with_cors_config(mut self, cors_config: HttpCorsConfig) -> Self {
        self.http.cors = cors_config;
        self
    }

    /// Activates only the specified middlewares.
    pub fn with_included_middlewares(mut self, middlewares: Vec<HttpMiddleware>) -> Self {
        self.http.middleware = Some(HttpMiddlewareConfig::Include(middlewares));
        self
    }

    /// Activates all middlewares except the specified ones.
    pub fn with_excluded_middlewares(mut self, middlewares: Vec<HttpMiddleware>) -> Self {
        self.http.middleware = Some(HttpMiddlewareConfig::Exclude(middlewares));
        self
    }

    /// Sets the graceful shutdown timeout of the HttpConfig.
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.http.shutdown_timeout = timeout;
        self
    }

    /// Sets the log format of the LoggingConfig.
    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.logging.format = format;
        self
    }

    /// Ensures the required values are present and the rest is usable.
    pub fn validate(&self) -> Result<()> {
        self.database.validate()?;
        self.http.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    ///
    /// Sets up the tracing subscriber based on the LoggingConfig.
    ///
    /// NOTE: Call this before anything logs. Later calls are ignored.
    ///
    pub fn setup_tracing(&self) {
        use tracing_subscriber::{EnvFilter, prelude::*};
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.logging.default_directive()));
        match self.logging.format {
            LogFormat::Json => {
                let _ = tracing_subscriber::registry()
                    .with(tracing_subscriber::fmt::layer().json())
                    .with(env_filter)
                    .try_init();
            }
            LogFormat::Default => {
                let _ = tracing_subscriber::registry()
                    .with(tracing_subscriber::fmt::layer())
                    .with(env_filter)
                    .try_init();
            }
            LogFormat::Compact => {
                let _ = tracing_subscriber::registry()
                    .with(tracing_subscriber::fmt::layer().compact())
                    .with(env_filter)
                    .try_init();
            }
            LogFormat::Pretty => {
                let _ = tracing_subscriber::registry()
                    .with(tracing_subscriber::fmt::layer().pretty())
                    .with(env_filter)
                    .try_init();
            }
        }
    }
}

fn parse_duration(key: &str, value: &str) -> Result<Duration> {
    humantime::parse_duration(value)
        .map_err(|e| Error::config(format!("{key} must be a duration like \"30s\": {e}")))
}

///
/// Parses a TOML configuration string, substituting environment variables
/// first. Validation is left to the caller so tests can build partial
/// configurations.
///
impl FromStr for Config {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        let config_file = replace_handlebars_with_env(s);
        let config = toml::from_str::<Config>(&config_file)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const CREDENTIALS: [(&str, &str); 4] = [
        ("DATABASE_USER", "folio"),
        ("DATABASE_PASSWORD", "s3cret"),
        ("DATABASE_CLUSTER", "db.internal:5432"),
        ("DATABASE_NAME", "portfolio"),
    ];

    #[test]
    fn test_from_lookup_defaults() {
        let config = Config::from_lookup(lookup_from(&CREDENTIALS)).unwrap();
        assert_eq!(config.http.bind_port, 3000);
        assert_eq!(config.http.bind_addr, "0.0.0.0");
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.http.cors.allowed_origins, vec!["*".to_string()]);
        assert_eq!(config.database.user, "folio");
        assert_eq!(config.database.password.0, "s3cret");
    }

    #[test]
    fn test_from_lookup_overrides() {
        let mut pairs = CREDENTIALS.to_vec();
        pairs.extend([
            ("PORT", "8282"),
            ("NODE_ENV", "production"),
            ("CORS_ORIGIN", "https://a.example, https://b.example"),
            ("LOG_FORMAT", "json"),
            ("SHUTDOWN_TIMEOUT", "5s"),
            ("DATABASE_MAX_POOL_SIZE", "12"),
        ]);
        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.http.bind_port, 8282);
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(
            config.http.cors.allowed_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
        assert!(matches!(config.logging.format, LogFormat::Json));
        assert_eq!(config.http.shutdown_timeout, Duration::from_secs(5));
        assert_eq!(config.database.max_pool_size, 12);
    }

    #[test]
    fn test_from_lookup_reports_all_missing_credentials() {
        let err = Config::from_lookup(lookup_from(&[("DATABASE_USER", "folio")])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        let msg = err.to_string();
        assert!(msg.starts_with("Missing required environment variables:"));
        assert!(msg.contains("DATABASE_PASSWORD"));
        assert!(msg.contains("DATABASE_CLUSTER"));
        assert!(msg.contains("DATABASE_NAME"));
        assert!(!msg.contains("DATABASE_USER"));
    }

    #[test]
    fn test_from_lookup_treats_blank_as_missing() {
        let mut pairs = CREDENTIALS.to_vec();
        pairs[1] = ("DATABASE_PASSWORD", "   ");
        let err = Config::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(err.to_string().contains("DATABASE_PASSWORD"));
    }

    #[test]
    fn test_from_lookup_rejects_bad_port() {
        let mut pairs = CREDENTIALS.to_vec();
        pairs.push(("PORT", "eighty"));
        let err = Config::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_from_lookup_rejects_bad_log_format() {
        let mut pairs = CREDENTIALS.to_vec();
        pairs.push(("LOG_FORMAT", "xml"));
        assert!(Config::from_lookup(lookup_from(&pairs)).is_err());
    }

    #[test]
    fn test_from_toml_with_handlebars() {
        unsafe {
            env::set_var("FOLIO_TEST_DB_PASSWORD", "from-env");
        }
        let config: Config = r#"
            environment = "test"

            [http]
            bind_port = 4000

            [database]
            user = "folio"
            password = "{{ FOLIO_TEST_DB_PASSWORD }}"
            cluster = "localhost"
            name = "portfolio"
        "#
        .parse()
        .unwrap();
        unsafe {
            env::remove_var("FOLIO_TEST_DB_PASSWORD");
        }

        assert_eq!(config.environment, Environment::Test);
        assert_eq!(config.http.bind_port, 4000);
        assert_eq!(config.database.password.0, "from-env");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml_invalid() {
        let result = "[http\nbind_port = 1".parse::<Config>();
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.toml");
        fs::write(
            &path,
            r#"
            [database]
            user = "u"
            password = "p"
            cluster = "c"
            name = "n"
            "#,
        )
        .unwrap();

        let config = Config::from_toml_file(&path).unwrap();
        assert_eq!(config.database.cluster, "c");
    }

    #[test]
    fn test_from_toml_file_missing() {
        let err = Config::from_toml_file("does/not/exist.toml").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_default_config_is_invalid() {
        // No store credentials
        assert!(Config::default().validate().is_err());
    }

    #[test]
    fn test_builder_methods() {
        let config = Config::default()
            .with_bind_addr("127.0.0.1")
            .with_bind_port(9000)
            .with_environment(Environment::Production)
            .with_shutdown_timeout(Duration::from_secs(1))
            .with_excluded_middlewares(vec![HttpMiddleware::Cors]);

        assert_eq!(config.http.full_bind_addr(), "127.0.0.1:9000");
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.http.shutdown_timeout, Duration::from_secs(1));
        assert!(!config.http.is_middleware_enabled(HttpMiddleware::Cors));
        assert!(config.http.is_middleware_enabled(HttpMiddleware::Logging));
    }
}
