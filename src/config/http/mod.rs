mod cors;
mod middleware;

pub use cors::*;
pub use middleware::*;

use {
    crate::{Error, Result},
    serde::Deserialize,
    std::{net::IpAddr, time::Duration},
};

///
/// Configuration for the HTTP server
///
/// Binding address and port, CORS policy, the graceful shutdown window and
/// the set of optional middlewares.
///
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// IP address to bind the HTTP server to, from `HOST`.
    /// The default `bind_addr` is "0.0.0.0".
    #[serde(default = "HttpConfig::default_bind_addr")]
    pub bind_addr: String,

    /// Port to bind the HTTP server to, from `PORT`.
    /// The default `bind_port` is 3000.
    #[serde(default = "HttpConfig::default_bind_port")]
    pub bind_port: u16,

    /// CORS configuration. Defaults to any origin.
    #[serde(default)]
    pub cors: HttpCorsConfig,

    /// Maximum time to wait for graceful shutdown to complete.
    /// After this timeout, the server will force shutdown.
    /// By default `shutdown_timeout` is set to 30 seconds.
    #[serde(
        default = "HttpConfig::default_shutdown_timeout",
        with = "humantime_serde"
    )]
    pub shutdown_timeout: Duration,

    /// Optional middleware selection. All middlewares run when absent.
    #[serde(default)]
    pub middleware: Option<HttpMiddlewareConfig>,
}

impl HttpConfig {
    ///
    /// Returns the full bind address as a string in the format "IP:PORT".
    ///
    pub fn full_bind_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.bind_port)
    }

    fn default_bind_addr() -> String {
        "0.0.0.0".into()
    }

    fn default_bind_port() -> u16 {
        3000
    }

    fn default_shutdown_timeout() -> Duration {
        Duration::from_secs(30)
    }

    pub fn is_middleware_enabled(&self, middleware: HttpMiddleware) -> bool {
        self.middleware
            .as_ref()
            .is_none_or(|config| config.is_enabled(middleware))
    }

    pub fn validate(&self) -> Result<()> {
        let addr = self.bind_addr.trim();
        if addr.is_empty() {
            return Err(Error::config(
                "HTTP bind address is required. Set HOST=0.0.0.0 or [http] bind_addr in config.",
            ));
        }
        if addr != "localhost" && addr.parse::<IpAddr>().is_err() {
            return Err(Error::config(format!(
                "HTTP bind address '{addr}' is not an IP address"
            )));
        }
        Ok(())
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            bind_addr: Self::default_bind_addr(),
            bind_port: Self::default_bind_port(),
            cors: HttpCorsConfig::default(),
            shutdown_timeout: Self::default_shutdown_timeout(),
            middleware: None,
        }
    }
}
