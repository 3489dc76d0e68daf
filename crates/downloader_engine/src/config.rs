use crate::FetchSettings;

/// Sites fetched when no URL list is configured.
pub const DEFAULT_URLS: [&str; 6] = [
    "https://www.yahoo.com",
    "https://www.google.com",
    "https://www.microsoft.com",
    "https://www.cnn.com",
    "https://www.codeproject.com",
    "https://www.stackoverflow.com",
];

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub urls: Vec<String>,
    pub fetch: FetchSettings,
    /// Worker bound for the parallel-blocking strategy; `None` uses rayon's global pool.
    pub parallel_workers: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            urls: DEFAULT_URLS.iter().map(|url| url.to_string()).collect(),
            fetch: FetchSettings::default(),
            parallel_workers: None,
        }
    }
}

impl EngineConfig {
    pub fn with_urls(urls: Vec<String>) -> Self {
        Self {
            urls,
            ..Self::default()
        }
    }
}
