use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::feed::DEFAULT_FEED_URL;
use crate::refresh::DEFAULT_INTERVAL;

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub feed_url: Option<String>,
    pub refresh_interval_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub desktop_notifications: Option<bool>,
}

impl Config {
    pub fn feed_url(&self) -> &str {
        self.feed_url.as_deref().unwrap_or(DEFAULT_FEED_URL)
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_INTERVAL)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn desktop_notifications(&self) -> bool {
        self.desktop_notifications.unwrap_or(true)
    }

    /// Reject values the refresh loop cannot work with.
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(self.feed_url())
            .map_err(|e| anyhow!("feed_url is not a valid URL: {e}"))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(anyhow!("feed_url must be http or https, got {}", url.scheme()));
        }
        if self.refresh_interval_secs == Some(0) {
            return Err(anyhow!("refresh_interval_secs must be greater than zero"));
        }
        if self.request_timeout_secs == Some(0) {
            return Err(anyhow!("request_timeout_secs must be greater than zero"));
        }
        Ok(())
    }
}

fn config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or_else(|| anyhow!("no config dir available"))?
        .join("inboxpert"))
}

pub fn config_path() -> Result<PathBuf> {
    let mut p = config_dir()?;
    fs::create_dir_all(&p)?;
    p.push("config.toml");
    Ok(p)
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

fn template() -> String {
    format!(
        "# inboxpert configuration\n\
         \n\
         # CSV export of the classification sheet.\n\
         feed_url = \"{DEFAULT_FEED_URL}\"\n\
         \n\
         # Seconds between automatic syncs.\n\
         refresh_interval_secs = {}\n\
         \n\
         # Per-request timeout in seconds. Unset means no timeout.\n\
         # request_timeout_secs = 20\n\
         \n\
         # Desktop notifications in `watch` mode.\n\
         desktop_notifications = true\n",
        DEFAULT_INTERVAL.as_secs()
    )
}

/// Read the config at `path`, writing a commented template with the defaults
/// if it is missing.
///
/// Values are not validated here; callers apply their overrides first and
/// then call [`Config::validate`].
pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        fs::write(path, template())?;
        log::info!("created default config at {}", path.display());
    }
    let s = fs::read_to_string(path)?;
    let cfg: Config =
        toml::from_str(&s).map_err(|e| anyhow!("invalid config {}: {e}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.feed_url(), DEFAULT_FEED_URL);
        assert_eq!(cfg.refresh_interval(), Duration::from_secs(30));
        assert_eq!(cfg.request_timeout(), None);
        assert!(cfg.desktop_notifications());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_missing_file_writes_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let cfg = load_config_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(cfg.feed_url(), DEFAULT_FEED_URL);
        assert_eq!(cfg.refresh_interval_secs, Some(30));
        assert_eq!(cfg.request_timeout(), None);
        assert!(cfg.desktop_notifications());

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("# inboxpert configuration"));
        assert!(text.contains("# request_timeout_secs = 20"));

        // The template reads back to the same values.
        assert_eq!(load_config_from(&path).unwrap(), cfg);
    }

    #[test]
    fn test_bad_file_value_can_be_overridden() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "feed_url = \"not a url\"\n").unwrap();

        let mut cfg = load_config_from(&path).unwrap();
        assert!(cfg.validate().is_err());

        cfg.feed_url = Some("https://example.com/feed.csv".into());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "refresh_interval_secs = 5\nrequest_timeout_secs = 10\n").unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.feed_url(), DEFAULT_FEED_URL);
        assert_eq!(cfg.refresh_interval(), Duration::from_secs(5));
        assert_eq!(cfg.request_timeout(), Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let cfg = Config {
            refresh_interval_secs: Some(0),
            ..Config::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = Config {
            feed_url: Some("ftp://example.com/feed.csv".into()),
            ..Config::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = Config {
            feed_url: Some("not a url".into()),
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_malformed_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "refresh_interval_secs = \"soon\"").unwrap();
        assert!(load_config_from(&path).is_err());
    }
}
