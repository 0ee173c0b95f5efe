use std::net::SocketAddr;
use std::path::PathBuf;

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
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// JSON file holding the full listing collection.
    pub data_path: PathBuf,
    /// JSON file backing the CLI's session/device key-value entries.
    pub session_path: PathBuf,
    pub uploads_dir: PathBuf,
    /// Public URL prefix for stored uploads, e.g. `/uploads`.
    pub uploads_url_prefix: String,
    pub max_upload_bytes: usize,
    pub migrate_secret: Option<String>,
    pub rate_limit_per_minute: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("data_path", &self.data_path)
            .field("session_path", &self.session_path)
            .field("uploads_dir", &self.uploads_dir)
            .field("uploads_url_prefix", &self.uploads_url_prefix)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field(
                "migrate_secret",
                &self.migrate_secret.as_ref().map(|_| "[redacted]"),
            )
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .finish()
    }
}
