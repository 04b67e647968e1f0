use std::env;
use std::time::Duration;

/// Scoring endpoint used when nothing else is configured.
pub const DEFAULT_ENDPOINT_URL: &str = "https://clip-onnx-interpretability.azurewebsites.net/score";

pub const ENV_ENDPOINT_URL: &str = "PRODCLASS_ENDPOINT_URL";
pub const ENV_API_KEY: &str = "PRODCLASS_API_KEY";
pub const ENV_TIMEOUT_SECS: &str = "PRODCLASS_TIMEOUT_SECS";
pub const ENV_MAX_IMAGE_EDGE: &str = "PRODCLASS_MAX_IMAGE_EDGE";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {name}: {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Settings for talking to the remote scoring service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub endpoint_url: String,
    pub api_key: Option<String>,
    /// Limit for a whole prediction request
    pub timeout: Duration,
    /// Limit for the health probe
    pub health_timeout: Duration,
    /// Images whose longest edge exceeds this are downscaled before upload
    pub max_image_edge: u32,
    pub jpeg_quality: u8,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint_url: DEFAULT_ENDPOINT_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(120),
            health_timeout: Duration::from_secs(5),
            max_image_edge: 128,
            jpeg_quality: 85,
        }
    }
}

impl ClientConfig {
    /// Starts from the defaults and overrides each field whose environment variable is set
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(url) = read_var(ENV_ENDPOINT_URL) {
            config.endpoint_url = url;
        }
        if let Some(key) = read_var(ENV_API_KEY) {
            config.api_key = Some(key);
        }
        if let Some(secs) = read_var(ENV_TIMEOUT_SECS) {
            let secs: u64 = parse_positive(ENV_TIMEOUT_SECS, &secs)?;
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(edge) = read_var(ENV_MAX_IMAGE_EDGE) {
            config.max_image_edge = parse_positive(ENV_MAX_IMAGE_EDGE, &edge)?;
        }

        log::debug!("Client config resolved: endpoint {}", config.endpoint_url);
        Ok(config)
    }

    pub fn with_endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint_url = url.into();
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Health endpoint derived from the scoring endpoint by swapping `/score` for `/health`.
    ///
    /// An endpoint without `/score` in it is returned unchanged, so the probe then sends a
    /// GET to the scoring URL itself.
    pub fn health_url(&self) -> String {
        match self.endpoint_url.strip_suffix("/score") {
            Some(base) => format!("{}/health", base),
            None => self.endpoint_url.replace("/score", "/health"),
        }
    }
}

fn read_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_positive<T>(name: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialEq + Default,
    T::Err: std::fmt::Display,
{
    let parsed: T = value.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        name,
        value: value.to_string(),
        reason: e.to_string(),
    })?;
    if parsed == T::default() {
        return Err(ConfigError::InvalidValue {
            name,
            value: value.to_string(),
            reason: "must be greater than zero".into(),
        });
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_url() {
        let config = ClientConfig::default().with_endpoint("http://localhost:5000/score");
        assert_eq!(config.health_url(), "http://localhost:5000/health");

        // No `/score` segment: the probe targets the endpoint as given
        let config = ClientConfig::default().with_endpoint("http://localhost:5000/api");
        assert_eq!(config.health_url(), "http://localhost:5000/api");
    }

    #[test]
    fn test_from_env() {
        // Single test touching the environment so parallel tests do not race.
        env::set_var(ENV_ENDPOINT_URL, "http://scoring.internal/score");
        env::set_var(ENV_TIMEOUT_SECS, "30");
        let config = ClientConfig::from_env().unwrap();
        assert_eq!(config.endpoint_url, "http://scoring.internal/score");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.max_image_edge, 128);

        env::set_var(ENV_TIMEOUT_SECS, "0");
        assert!(matches!(ClientConfig::from_env(), Err(ConfigError::InvalidValue { .. })));

        env::set_var(ENV_TIMEOUT_SECS, "soon");
        assert!(ClientConfig::from_env().is_err());

        env::remove_var(ENV_ENDPOINT_URL);
        env::remove_var(ENV_TIMEOUT_SECS);
        let config = ClientConfig::from_env().unwrap();
        assert_eq!(config.endpoint_url, DEFAULT_ENDPOINT_URL);
    }
}
