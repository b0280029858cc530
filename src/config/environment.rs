use {serde::Deserialize, std::fmt};

///
/// The deployment environment, read from `NODE_ENV`.
///
/// Only `Development` exposes internal error details in responses.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum Environment {
    #[default]
    Development,
    Production,
    Test,
}

impl Environment {
    /// Maps an environment name to a variant.
    ///
    /// Unrecognized names map to `Production` so an unexpected value never
    /// turns on development-only output.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "development" | "dev" => Environment::Development,
            "production" | "prod" => Environment::Production,
            "test" => Environment::Test,
            other => {
                tracing::warn!(environment = %other, "Unknown environment, treating as production");
                Environment::Production
            }
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
            Environment::Test => "test",
        }
    }
}

impl From<String> for Environment {
    fn from(name: String) -> Self {
        Environment::from_name(&name)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(Environment::from_name("development"), Environment::Development);
        assert_eq!(Environment::from_name("DEV"), Environment::Development);
        assert_eq!(Environment::from_name("production"), Environment::Production);
        assert_eq!(Environment::from_name("prod"), Environment::Production);
        assert_eq!(Environment::from_name(" test "), Environment::Test);
    }

    #[test]
    fn test_unknown_is_production() {
        assert_eq!(Environment::from_name("staging"), Environment::Production);
        assert!(!Environment::from_name("staging").is_development());
    }

    #[test]
    fn test_display_round_trips_through_from_name() {
        for env in [Environment::Development, Environment::Production, Environment::Test] {
            assert_eq!(Environment::from_name(&env.to_string()), env);
        }
    }
}
