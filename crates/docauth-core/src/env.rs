// Environment configuration and logger setup.
//
// The adapter itself never reads the environment; callers load an `AuthEnv`
// once at startup and hand the pieces to whatever needs them.

use std::fmt;

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvMode {
    Production,
    Development,
    Test,
}

impl EnvMode {
    fn parse(raw: &str) -> Self {
        match raw.to_lowercase().as_str() {
            "production" | "prod" => EnvMode::Production,
            "test" | "testing" => EnvMode::Test,
            _ => EnvMode::Development,
        }
    }

    /// Filter directive used when `RUST_LOG` is unset.
    pub fn default_filter(self) -> &'static str {
        match self {
            EnvMode::Production => "docauth=info",
            EnvMode::Development | EnvMode::Test => "docauth=debug",
        }
    }
}

/// Initialize the `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise the filter follows `mode`. Later
/// calls are ignored once a global subscriber is installed.
pub fn init_logger(mode: EnvMode) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(mode.default_filter()));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok();
    if installed {
        tracing::debug!(?mode, "logger initialized");
    }
}

/// Client credentials for an external identity provider.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Everything the auth stack consumes from the process environment.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthEnv {
    pub mode: EnvMode,
    /// Store connection string.
    pub mongodb_url: String,
    /// Target database name.
    pub db_name: String,
    /// Secret used to sign session tokens.
    pub secret: String,
    pub github: ProviderCredentials,
}

impl fmt::Debug for AuthEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthEnv")
            .field("mode", &self.mode)
            .field("mongodb_url", &"<redacted>")
            .field("db_name", &self.db_name)
            .field("secret", &"<redacted>")
            .field("github", &self.github)
            .finish()
    }
}

impl AuthEnv {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| -> Result<String, ConfigError> {
            match lookup(key) {
                Some(v) if !v.trim().is_empty() => Ok(v),
                _ => Err(ConfigError::Missing(key)),
            }
        };

        let mongodb_url = required("MONGODB_URL")?;
        if !(mongodb_url.starts_with("mongodb://") || mongodb_url.starts_with("mongodb+srv://")) {
            return Err(ConfigError::Invalid {
                name: "MONGODB_URL",
                reason: "expected a mongodb:// or mongodb+srv:// connection string".into(),
            });
        }

        let mode = ["DOCAUTH_ENV", "RUST_ENV", "NODE_ENV"]
            .iter()
            .find_map(|key| lookup(key))
            .map(|raw| EnvMode::parse(&raw))
            .unwrap_or(EnvMode::Development);

        Ok(Self {
            mode,
            mongodb_url,
            db_name: required("DB_NAME")?,
            secret: required("NEXTAUTH_SECRET")?,
            github: ProviderCredentials {
                client_id: required("GITHUB_CLIENT_ID")?,
                client_secret: required("GITHUB_CLIENT_SECRET")?,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn full_env() -> HashMap<&'static str, String> {
        HashMap::from([
            ("MONGODB_URL", "mongodb://localhost:27017".to_string()),
            ("DB_NAME", "auth".to_string()),
            ("NEXTAUTH_SECRET", "s3cret".to_string()),
            ("GITHUB_CLIENT_ID", "cid".to_string()),
            ("GITHUB_CLIENT_SECRET", "csecret".to_string()),
        ])
    }

    fn load(vars: &HashMap<&'static str, String>) -> Result<AuthEnv, ConfigError> {
        AuthEnv::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn test_load_complete_env() {
        let env = load(&full_env()).unwrap();
        assert_eq!(env.db_name, "auth");
        assert_eq!(env.github.client_id, "cid");
        assert_eq!(env.mode, EnvMode::Development);
    }

    #[test]
    fn test_missing_variable() {
        let mut vars = full_env();
        vars.remove("NEXTAUTH_SECRET");
        assert_eq!(load(&vars), Err(ConfigError::Missing("NEXTAUTH_SECRET")));
    }

    #[test]
    fn test_blank_variable_is_missing() {
        let mut vars = full_env();
        vars.insert("DB_NAME", "  ".into());
        assert_eq!(load(&vars), Err(ConfigError::Missing("DB_NAME")));
    }

    #[test]
    fn test_invalid_connection_string() {
        let mut vars = full_env();
        vars.insert("MONGODB_URL", "postgres://localhost".into());
        assert!(matches!(
            load(&vars),
            Err(ConfigError::Invalid { name: "MONGODB_URL", .. })
        ));
    }

    #[test]
    fn test_mode_from_node_env() {
        let mut vars = full_env();
        vars.insert("NODE_ENV", "production".into());
        assert_eq!(load(&vars).unwrap().mode, EnvMode::Production);
    }

    #[test]
    fn test_default_filter_follows_mode() {
        assert_eq!(EnvMode::Production.default_filter(), "docauth=info");
        assert_eq!(EnvMode::Development.default_filter(), "docauth=debug");
        assert_eq!(EnvMode::Test.default_filter(), "docauth=debug");

        let mut vars = full_env();
        vars.insert("RUST_ENV", "prod".into());
        assert_eq!(load(&vars).unwrap().mode.default_filter(), "docauth=info");
    }

    #[test]
    fn test_init_logger_is_repeatable() {
        init_logger(EnvMode::Test);
        init_logger(EnvMode::Production);
        tracing::debug!("still logging");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let rendered = format!("{:?}", load(&full_env()).unwrap());
        assert!(!rendered.contains("s3cret"));
        assert!(!rendered.contains("csecret"));
        assert!(rendered.contains("<redacted>"));
    }
}
