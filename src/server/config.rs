use super::RequestsLoggingLevel;

pub const DEFAULT_BREEDS_BASE_PATH: &str = "/dogs";

#[derive(Clone)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    pub metrics_port: u16,
    /// Where the breed routes are mounted, e.g. `/dogs`.
    pub breeds_base_path: String,
    pub frontend_dir_path: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: 3001,
            metrics_port: 9091,
            breeds_base_path: DEFAULT_BREEDS_BASE_PATH.to_string(),
            frontend_dir_path: None,
        }
    }
}
