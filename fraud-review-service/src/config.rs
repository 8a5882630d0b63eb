use std::time::Duration;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8080";
pub const DEFAULT_PORT: u16 = 5001;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Per-route timeouts for calls to the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayTimeouts {
    pub extract: Duration,
    pub chat: Duration,
    pub graph: Duration,
    pub evaluate: Duration,
}

impl Default for RelayTimeouts {
    fn default() -> Self {
        Self {
            extract: Duration::from_secs(60),
            chat: Duration::from_secs(30),
            graph: Duration::from_secs(120),
            evaluate: Duration::from_secs(300),
        }
    }
}

/// Service settings, read once at startup
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub backend_url: String,
    pub port: u16,
    pub log_format: LogFormat,
    pub timeouts: RelayTimeouts,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            port: DEFAULT_PORT,
            log_format: LogFormat::Json,
            timeouts: RelayTimeouts::default(),
        }
    }
}

impl ServiceConfig {
    /// Reads `BACKEND_URL`, `PORT` and `LOG_FORMAT` from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let backend_url = lookup("BACKEND_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());

        let port = lookup("PORT")
            .and_then(|p| p.trim().parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let log_format = match lookup("LOG_FORMAT").as_deref() {
            Some("pretty") => LogFormat::Pretty,
            _ => LogFormat::Json,
        };

        Self {
            backend_url,
            port,
            log_format,
            timeouts: RelayTimeouts::default(),
        }
    }
}
