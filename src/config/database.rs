use {
    crate::{Error, Result, Sensitive},
    serde::Deserialize,
    sqlx_postgres::{PgConnectOptions, PgSslMode},
    std::{str::FromStr, time::Duration},
    url::Url,
};

///
/// Credentials and pool settings for the document store.
///
/// The four credential fields are required. They are assembled into a
/// connection URL with percent-encoded user and password, so passwords may
/// contain any character.
///
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Login name, from `DATABASE_USER`.
    #[serde(default)]
    pub user: String,

    /// Password, from `DATABASE_PASSWORD`. Never printed.
    #[serde(default)]
    pub password: Sensitive<String>,

    /// Host (optionally `host:port`), from `DATABASE_CLUSTER`.
    #[serde(default)]
    pub cluster: String,

    /// Database name, from `DATABASE_NAME`.
    #[serde(default)]
    pub name: String,

    /// Sets the maximum number of connections in the pool.
    /// By default `max_pool_size` is set to 5.
    #[serde(default = "DatabaseConfig::default_max_pool_size")]
    pub max_pool_size: u32,

    /// How long to wait for a pooled connection before failing the request.
    /// By default `acquire_timeout` is 10 seconds.
    #[serde(
        default = "DatabaseConfig::default_acquire_timeout",
        with = "humantime_serde"
    )]
    pub acquire_timeout: Duration,
}

impl DatabaseConfig {
    pub const USER_VAR: &'static str = "DATABASE_USER";
    pub const PASSWORD_VAR: &'static str = "DATABASE_PASSWORD";
    pub const CLUSTER_VAR: &'static str = "DATABASE_CLUSTER";
    pub const NAME_VAR: &'static str = "DATABASE_NAME";

    fn default_max_pool_size() -> u32 {
        5
    }

    fn default_acquire_timeout() -> Duration {
        Duration::from_secs(10)
    }

    ///
    /// Checks every credential and reports all missing ones at once.
    ///
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = [
            (Self::USER_VAR, self.user.as_str()),
            (Self::PASSWORD_VAR, self.password.0.as_str()),
            (Self::CLUSTER_VAR, self.cluster.as_str()),
            (Self::NAME_VAR, self.name.as_str()),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(var, _)| var)
        .collect();

        if !missing.is_empty() {
            return Err(Error::config(format!(
                "Missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        if self.max_pool_size == 0 {
            return Err(Error::config("DATABASE_MAX_POOL_SIZE must be > 0"));
        }

        Ok(())
    }

    ///
    /// Builds the connection URL from the credentials.
    ///
    /// The result contains the password in clear text; do not log it.
    ///
    pub fn connection_url(&self) -> Result<Url> {
        let mut url = Url::parse(&format!("postgres://{}/", self.cluster.trim()))?;
        url.set_username(self.user.trim())
            .map_err(|_| Error::config("DATABASE_USER cannot be used in a connection URL"))?;
        url.set_password(Some(&self.password.0))
            .map_err(|_| Error::config("DATABASE_PASSWORD cannot be used in a connection URL"))?;
        url.set_path(self.name.trim());
        Ok(url)
    }

    /// The connection URL with the password masked, for log output.
    pub fn redacted_url(&self) -> String {
        match self.connection_url() {
            Ok(mut url) => {
                let _ = url.set_password(Some("****"));
                url.to_string()
            }
            Err(_) => format!("postgres://{}/{}", self.cluster, self.name),
        }
    }

    /// Connection options with TLS preferred and the application name set.
    pub fn connect_options(&self) -> Result<PgConnectOptions> {
        let url = self.connection_url()?;
        let options = PgConnectOptions::from_str(url.as_str())
            .map_err(|e| Error::config(format!("Invalid database connection settings: {e}")))?
            .application_name(env!("CARGO_PKG_NAME"))
            .ssl_mode(PgSslMode::Prefer);
        Ok(options)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            user: String::new(),
            password: Sensitive::default(),
            cluster: String::new(),
            name: String::new(),
            max_pool_size: Self::default_max_pool_size(),
            acquire_timeout: Self::default_acquire_timeout(),
        }
    }
}
