use chrono::{FixedOffset, Offset, Utc};

const DEFAULT_UPSTREAM_BASE_URL: &str = "https://api.yjwujian.cn/yjwj/competition-center-server";
const DEFAULT_DATABASE_PATH: &str = "naraka_tournaments.db";

#[derive(Debug, Clone)]
pub struct UpstreamSettings {
    pub base_url: String,
    pub user_agent: &'static str,
    /// No timeout unless set; a hung upstream call blocks the sync step.
    pub timeout_secs: Option<u64>,
    pub model_type: u8,
    pub is_all: u8,
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_UPSTREAM_BASE_URL.to_string(),
            user_agent: "PostmanRuntime/7.36.0",
            timeout_secs: None,
            model_type: 1,
            is_all: 1,
        }
    }
}

impl UpstreamSettings {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Host part of the base URL, sent as a fixed `Host` header.
    pub fn host(&self) -> Option<&str> {
        let without_scheme = self
            .base_url
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(&self.base_url);
        without_scheme.split('/').next().filter(|h| !h.is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct StorageSettings {
    pub database_path: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            database_path: DEFAULT_DATABASE_PATH.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DisplaySettings {
    /// Asia/Bangkok has no DST, so a fixed offset is exact.
    pub utc_offset_hours: i32,
    pub format: &'static str,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            utc_offset_hours: 7,
            format: "%Y-%m-%d %H:%M:%S",
        }
    }
}

impl DisplaySettings {
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_hours * 3600).unwrap_or_else(|| Utc.fix())
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub upstream: UpstreamSettings,
    pub storage: StorageSettings,
    pub display: DisplaySettings,
}

impl AppConfig {
    /// Defaults, overridden by `UPSTREAM_BASE_URL` and `DATABASE_PATH` when set.
    pub fn new() -> Self {
        let mut config = Self::default();

        if let Ok(base_url) = std::env::var("UPSTREAM_BASE_URL") {
            config.upstream.base_url = base_url;
        }
        if let Ok(path) = std::env::var("DATABASE_PATH") {
            config.storage.database_path = path;
        }

        config
    }
}
