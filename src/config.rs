use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs, io};

pub const APP_DIR: &str = "daily-kanban";
pub const DEFAULT_API_URL: &str = "https://nestauth-api-production.up.railway.app";

const API_URL_ENV: &str = "DAILY_KANBAN_API_URL";
const STORAGE_ENV: &str = "DAILY_KANBAN_STORAGE";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub storage_path: PathBuf,
    pub log_path: PathBuf,
    pub reset_check_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = data_dir();
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            storage_path: data_dir.join("storage.json"),
            log_path: data_dir.join("daily-kanban.log"),
            reset_check_interval_secs: 60,
        }
    }
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
}

impl Config {
    /// Reads `path`, or the default config file when `path` is `None`.
    /// A missing default file yields the defaults; a missing explicit file is
    /// an error. Environment overrides are applied afterwards.
    pub fn load(path: Option<&Path>) -> io::Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        Ok(config.with_env_overrides(|key| env::var(key).ok()))
    }

    pub fn from_file(path: &Path) -> io::Result<Self> {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    fn with_env_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = var(API_URL_ENV).filter(|v| !v.is_empty()) {
            self.api_base_url = url;
        }
        if let Some(path) = var(STORAGE_ENV).filter(|v| !v.is_empty()) {
            self.storage_path = PathBuf::from(path);
        }
        self
    }

    pub fn reset_check_interval(&self) -> Duration {
        Duration::from_secs(self.reset_check_interval_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "api_base_url = \"http://localhost:3000\"\nreset_check_interval_secs = 30\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.api_base_url, "http://localhost:3000");
        assert_eq!(config.reset_check_interval(), Duration::from_secs(30));
        assert_eq!(config.storage_path, Config::default().storage_path);
    }

    #[test]
    fn invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "reset_check_interval_secs = \"soon\"").unwrap();

        let err = Config::from_file(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn env_overrides_win() {
        let config = Config::default().with_env_overrides(|key| match key {
            API_URL_ENV => Some("http://api.test".to_string()),
            STORAGE_ENV => Some("/tmp/board.json".to_string()),
            _ => None,
        });
        assert_eq!(config.api_base_url, "http://api.test");
        assert_eq!(config.storage_path, PathBuf::from("/tmp/board.json"));
    }

    #[test]
    fn zero_interval_is_clamped() {
        let config = Config {
            reset_check_interval_secs: 0,
            ..Config::default()
        };
        assert_eq!(config.reset_check_interval(), Duration::from_secs(1));
    }
}
