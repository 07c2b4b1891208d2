use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

#[derive(Clone, Debug)]
pub struct Config {
    /// Upper bound on a webhook request, from send to full response.
    pub webhook_timeout: Duration,
    /// Where the native key-value files and the SQLite database live.
    pub data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            webhook_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            data_dir: default_data_dir(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            webhook_timeout: std::env::var("WEBHOOK_CHAT_TIMEOUT_MS")
                .ok()
                .and_then(|ms| ms.trim().parse::<u64>().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.webhook_timeout),
            data_dir: std::env::var("WEBHOOK_CHAT_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
        }
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.webhook_timeout = timeout;
        self
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("webhook-chat"))
        .unwrap_or_else(|| PathBuf::from(".webhook-chat"))
}

// The browser keeps everything in origin storage.
#[cfg(target_arch = "wasm32")]
fn default_data_dir() -> PathBuf {
    PathBuf::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timeout_is_five_seconds() {
        assert_eq!(Config::default().webhook_timeout, Duration::from_millis(5000));
    }

    #[test]
    fn test_builders_override_defaults() {
        let config = Config::default()
            .with_data_dir("/tmp/chat")
            .with_timeout(Duration::from_millis(250));
        assert_eq!(config.data_dir, PathBuf::from("/tmp/chat"));
        assert_eq!(config.webhook_timeout, Duration::from_millis(250));
    }
}
