use std::path::PathBuf;

#[derive(Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub data_path: PathBuf,
    pub catalog_path: PathBuf,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub inter_request_delay_ms: u64,
    pub max_retries: u32,
    pub retry_backoff_base_secs: u64,
    pub default_zoom: f64,
    pub wikiloc_activity: String,
    pub wikiloc_limit: u32,
    pub wikiloc_radius_km: f64,
    pub wikiloc_use_map: bool,
    pub wikiloc_cookie: Option<String>,
    /// Raw JSON object of extra request headers for Wikiloc.
    pub wikiloc_headers: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field("data_path", &self.data_path)
            .field("catalog_path", &self.catalog_path)
            .field("user_agent", &self.user_agent)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("inter_request_delay_ms", &self.inter_request_delay_ms)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_secs", &self.retry_backoff_base_secs)
            .field("default_zoom", &self.default_zoom)
            .field("wikiloc_activity", &self.wikiloc_activity)
            .field("wikiloc_limit", &self.wikiloc_limit)
            .field("wikiloc_radius_km", &self.wikiloc_radius_km)
            .field("wikiloc_use_map", &self.wikiloc_use_map)
            .field(
                "wikiloc_cookie",
                &self.wikiloc_cookie.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "wikiloc_headers",
                &self.wikiloc_headers.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}
