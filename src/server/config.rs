use super::RequestsLoggingLevel;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub host: String,
    pub port: u16,
    pub content_cache_age_sec: usize,
    pub frontend_dir_path: Option<String>,
    /// Page size of `/api/nutrition/all` when `per_page` is not given.
    pub default_page_size: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            host: "127.0.0.1".to_owned(),
            port: 5000,
            content_cache_age_sec: 3600,
            frontend_dir_path: None,
            default_page_size: 50,
        }
    }
}
