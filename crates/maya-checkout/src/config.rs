use std::env;
use std::str::FromStr;
use url::Url;

/// Maya sandbox API host.
pub const SANDBOX_URL: &str = "https://pg-sandbox.paymaya.com";

/// Maya production API host.
pub const PRODUCTION_URL: &str = "https://pg.paymaya.com";

/// Which Maya deployment to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Sandbox,
    Production,
}

impl Environment {
    pub fn base_url(&self) -> &'static str {
        match self {
            Environment::Sandbox => SANDBOX_URL,
            Environment::Production => PRODUCTION_URL,
        }
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sandbox" | "test" | "true" => Ok(Environment::Sandbox),
            "production" | "live" | "false" => Ok(Environment::Production),
            other => Err(ConfigError::InvalidEnvironment(other.to_string())),
        }
    }
}

/// Credentials and host selection for [`MayaClient`](crate::MayaClient).
#[derive(Clone)]
pub struct MayaConfig {
    pub environment: Environment,
    /// Public key, used for checkouts and card tokenization.
    pub public_key: String,
    /// Secret key, used for vault customers, cards and payment lookups.
    pub secret_key: Option<String>,
    /// Overrides the environment's host (proxies, mock servers).
    pub base_url: Option<String>,
}

impl std::fmt::Debug for MayaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MayaConfig")
            .field("environment", &self.environment)
            .field("public_key", &"[REDACTED]")
            .field("secret_key", &self.secret_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl MayaConfig {
    pub fn new(environment: Environment, public_key: impl Into<String>) -> Self {
        Self {
            environment,
            public_key: public_key.into(),
            secret_key: None,
            base_url: None,
        }
    }

    pub fn with_secret_key(mut self, secret_key: impl Into<String>) -> Self {
        self.secret_key = Some(secret_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Host every request path is appended to, without a trailing slash.
    pub fn api_base(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.environment.base_url())
            .trim_end_matches('/')
    }

    pub fn secret_key(&self) -> Result<&str, ConfigError> {
        self.secret_key
            .as_deref()
            .ok_or(ConfigError::MissingRequired("MAYA_SECRET_KEY"))
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        // Required: public key
        let public_key = env::var("MAYA_PUBLIC_KEY")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingRequired("MAYA_PUBLIC_KEY"))?;

        // Optional: secret key (vault endpoints only)
        let secret_key = env::var("MAYA_SECRET_KEY").ok().filter(|s| !s.is_empty());

        let environment = match env::var("MAYA_ENVIRONMENT") {
            Ok(value) if !value.is_empty() => value.parse()?,
            _ => Environment::default(),
        };

        let base_url = env::var("MAYA_BASE_URL").ok().filter(|s| !s.is_empty());
        if let Some(ref url) = base_url {
            Url::parse(url).map_err(|_| ConfigError::InvalidUrl(url.clone()))?;
        }

        if environment == Environment::Production && base_url.is_none() {
            tracing::info!("using Maya production API at {}", PRODUCTION_URL);
        }

        Ok(Self {
            environment,
            public_key,
            secret_key,
            base_url,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingRequired(&'static str),

    #[error("invalid environment: {0} (expected sandbox or production)")]
    InvalidEnvironment(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_selects_host() {
        let sandbox = MayaConfig::new(Environment::Sandbox, "pk");
        assert_eq!(sandbox.api_base(), "https://pg-sandbox.paymaya.com");

        let production = MayaConfig::new(Environment::Production, "pk");
        assert_eq!(production.api_base(), "https://pg.paymaya.com");
    }

    #[test]
    fn test_base_url_override_trims_slash() {
        let config = MayaConfig::new(Environment::Production, "pk").with_base_url("http://127.0.0.1:9000/");
        assert_eq!(config.api_base(), "http://127.0.0.1:9000");
    }

    #[test]
    fn test_parse_environment() {
        assert_eq!("Sandbox".parse::<Environment>().unwrap(), Environment::Sandbox);
        assert_eq!("live".parse::<Environment>().unwrap(), Environment::Production);
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn test_missing_secret_key() {
        let config = MayaConfig::new(Environment::Sandbox, "pk");
        assert!(matches!(
            config.secret_key(),
            Err(ConfigError::MissingRequired("MAYA_SECRET_KEY"))
        ));
        assert_eq!(config.with_secret_key("sk").secret_key().unwrap(), "sk");
    }

    #[test]
    fn test_debug_redacts_keys() {
        let config = MayaConfig::new(Environment::Sandbox, "pk-live-123").with_secret_key("sk-live-456");
        let debug = format!("{config:?}");
        assert!(!debug.contains("pk-live-123"));
        assert!(!debug.contains("sk-live-456"));
        assert!(debug.contains("[REDACTED]"));
    }
}
