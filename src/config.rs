//! Portal client configuration, read from `CAMPUSGATE_*` environment variables
//! with defaults; the binary lets command-line flags override each value.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:4000/api";
pub const DEFAULT_MEDIA_URL: &str = "http://127.0.0.1:4000/media";
pub const DEFAULT_STATE_DIR: &str = ".campusgate";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalConfig {
    pub api_url: String,
    pub media_url: String,
    /// Directory holding the durable session file. `None` keeps the session in memory.
    pub state_dir: Option<PathBuf>,
    pub http_timeout: Duration,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            media_url: DEFAULT_MEDIA_URL.to_string(),
            state_dir: Some(PathBuf::from(DEFAULT_STATE_DIR)),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl PortalConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset;
    /// an unparseable timeout keeps the default.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let get = |k: &str| get(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut cfg = Self::default();
        if let Some(v) = get("CAMPUSGATE_API_URL") { cfg.api_url = v; }
        if let Some(v) = get("CAMPUSGATE_MEDIA_URL") { cfg.media_url = v; }
        if let Some(v) = get("CAMPUSGATE_STATE_DIR") { cfg.state_dir = Some(PathBuf::from(v)); }
        if let Some(secs) = get("CAMPUSGATE_HTTP_TIMEOUT_SECS").and_then(|v| v.parse::<u64>().ok()) {
            if secs > 0 { cfg.http_timeout = Duration::from_secs(secs); }
        }
        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_when_unset() {
        let cfg = PortalConfig::from_lookup(|_| None);
        assert_eq!(cfg, PortalConfig::default());
        assert_eq!(cfg.state_dir, Some(PathBuf::from(".campusgate")));
    }

    #[test]
    fn overrides_and_bad_values() {
        let vars: HashMap<&str, &str> = [
            ("CAMPUSGATE_API_URL", "https://college.example/api"),
            ("CAMPUSGATE_MEDIA_URL", " "),
            ("CAMPUSGATE_STATE_DIR", "/tmp/cg"),
            ("CAMPUSGATE_HTTP_TIMEOUT_SECS", "abc"),
        ].into_iter().collect();
        let cfg = PortalConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.api_url, "https://college.example/api");
        assert_eq!(cfg.media_url, DEFAULT_MEDIA_URL);
        assert_eq!(cfg.state_dir, Some(PathBuf::from("/tmp/cg")));
        assert_eq!(cfg.http_timeout, Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS));
    }
}
