use {
    crate::{Error, Result},
    serde::Deserialize,
    std::str::FromStr,
};

///
/// Configuration for logging and tracing.
///
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Format for log output.
    /// The default format is `default`, which is "full" human-readable format.
    /// Other options are `json`, `compact`, and `pretty`.
    #[serde(default)]
    pub format: LogFormat,

    /// Filter used when `RUST_LOG` is not set.
    /// By default `level` is "info".
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".into()
    }

    /// The `EnvFilter` directive applied when `RUST_LOG` is absent.
    pub fn default_directive(&self) -> String {
        format!("{}={},tower_http={}", env!("CARGO_CRATE_NAME"), self.level, self.level)
    }

    pub fn validate(&self) -> Result<()> {
        if self.level.trim().is_empty() {
            return Err(Error::config("logging level must not be empty"));
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            format: LogFormat::default(),
            level: Self::default_level(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Default,
    Compact,
    Pretty,
}

impl FromStr for LogFormat {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "default" | "full" => Ok(LogFormat::Default),
            "compact" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            other => Err(Error::config(format!(
                "Unknown log format '{other}'. Expected json, default, compact or pretty"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_from_str() {
        assert!(matches!("JSON".parse::<LogFormat>(), Ok(LogFormat::Json)));
        assert!(matches!("pretty".parse::<LogFormat>(), Ok(LogFormat::Pretty)));
        assert!("yaml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_default_directive_names_crate() {
        let directive = LoggingConfig::default().default_directive();
        assert!(directive.starts_with("folio_content=info"));
    }
}
