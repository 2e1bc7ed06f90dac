use std::time::Duration;

use runtime::ServerConfig;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Ingress settings derived from the `server` section of the app config.
#[derive(Debug, Clone)]
pub struct ApiIngressConfig {
    pub bind_addr: String,
    pub timeout: Duration,
    pub cors_enabled: bool,
    pub body_limit_bytes: usize,
}

impl Default for ApiIngressConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8087".to_string(),
            timeout: DEFAULT_TIMEOUT,
            cors_enabled: false,
            body_limit_bytes: 1024 * 1024,
        }
    }
}

impl From<&ServerConfig> for ApiIngressConfig {
    fn from(s: &ServerConfig) -> Self {
        Self {
            bind_addr: format!("{}:{}", s.host, s.port),
            timeout: match s.timeout_sec {
                0 => DEFAULT_TIMEOUT,
                n => Duration::from_secs(n),
            },
            cors_enabled: s.cors_enabled,
            body_limit_bytes: s.body_limit_bytes,
        }
    }
}
