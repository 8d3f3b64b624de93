use std::net::SocketAddr;

use crate::Unit;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub search_url: String,
    pub index_name: String,
    pub search_timeout_secs: u64,
    pub geocoder_url: String,
    pub geocoder_api_key: Option<String>,
    pub geocoder_timeout_secs: u64,
    pub geocoder_max_attempts: u32,
    pub geocoder_backoff_secs: u64,
    pub user_agent: String,
    pub bind_addr: SocketAddr,
    pub request_timeout_secs: u64,
    pub default_unit: Unit,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("search_url", &self.search_url)
            .field("index_name", &self.index_name)
            .field("search_timeout_secs", &self.search_timeout_secs)
            .field("geocoder_url", &self.geocoder_url)
            .field(
                "geocoder_api_key",
                &self.geocoder_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("geocoder_timeout_secs", &self.geocoder_timeout_secs)
            .field("geocoder_max_attempts", &self.geocoder_max_attempts)
            .field("geocoder_backoff_secs", &self.geocoder_backoff_secs)
            .field("user_agent", &self.user_agent)
            .field("bind_addr", &self.bind_addr)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("default_unit", &self.default_unit)
            .finish()
    }
}
