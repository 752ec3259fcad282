/*
[INPUT]:  YAML configuration file and MEGAWEB_* environment variables
[OUTPUT]: Parsed tracker configuration (server, polling policy, form defaults)
[POS]:    Configuration layer - client setup
[UPDATE]: When adding new configuration options
*/

use anyhow::{Context, Result, anyhow};
use config::{Environment, File, FileFormat};
use megaweb_adapter::{ClientConfig, DEFAULT_BASE_URL};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::poller::PollPolicy;

/// Prefix of environment overrides, e.g. `MEGAWEB_SERVER__BASE_URL`
pub const ENV_PREFIX: &str = "MEGAWEB";

/// Top-level configuration for the task tracker
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TrackerConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub forms: FormsConfig,
}

/// Task API server connection
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl ServerConfig {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
        }
    }
}

/// Poll loop bounds
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PollingConfig {
    /// Delay between two status requests of one task
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Stop after this many status requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
    /// Stop once the loop has run this long
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            max_attempts: None,
            timeout_secs: None,
        }
    }
}

impl PollingConfig {
    pub fn policy(&self) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_millis(self.interval_ms),
            max_attempts: self.max_attempts,
            timeout: self.timeout_secs.map(Duration::from_secs),
        }
    }
}

/// Form defaults
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct FormsConfig {
    /// Folder prefilled in every form, `~/Downloads` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_folder: Option<PathBuf>,
}

impl FormsConfig {
    pub fn default_folder(&self) -> PathBuf {
        self.default_folder
            .clone()
            .unwrap_or_else(default_download_folder)
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_interval_ms() -> u64 {
    1000
}

pub fn default_download_folder() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join("Downloads"))
        .unwrap_or_else(|| PathBuf::from("Downloads"))
}

impl TrackerConfig {
    /// `~/.megaweb/config.yaml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".megaweb").join("config.yaml"))
    }

    /// Load the layered configuration: defaults, then the YAML file, then
    /// `MEGAWEB_*` environment variables.
    ///
    /// An explicit `path` must exist; the default path is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Same as [`TrackerConfig::load`] with the environment replaced by `env` when given
    pub fn load_with_env(
        path: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self> {
        let mut builder = config::Config::builder();

        match path {
            Some(path) => {
                builder = builder.add_source(
                    File::from(path)
                        .format(FileFormat::Yaml)
                        .required(true),
                );
            }
            None => {
                if let Some(default_path) = Self::default_path() {
                    builder = builder.add_source(
                        File::from(default_path)
                            .format(FileFormat::Yaml)
                            .required(false),
                    );
                }
            }
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let config: Self = builder
            .build()
            .context("read configuration sources")?
            .try_deserialize()
            .context("parse configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.server.base_url)
            .with_context(|| format!("invalid server.base_url '{}'", self.server.base_url))?;
        if self.polling.interval_ms == 0 {
            return Err(anyhow!("polling.interval_ms must be greater than zero"));
        }
        if self.polling.max_attempts == Some(0) {
            return Err(anyhow!("polling.max_attempts must be greater than zero"));
        }
        Ok(())
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("serialize config to YAML")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_yaml(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".yaml")
            .tempfile()
            .expect("temp file");
        file.write_all(content.as_bytes()).expect("write yaml");
        file
    }

    fn no_env() -> Option<config::Map<String, String>> {
        Some(config::Map::new())
    }

    #[test]
    fn test_defaults_without_file() {
        let file = write_yaml("{}\n");
        let config = TrackerConfig::load_with_env(Some(file.path()), no_env()).unwrap();

        assert_eq!(config.server.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.polling.policy(), PollPolicy::default());
        assert_eq!(config.server.client_config().timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_file_values() {
        let file = write_yaml(
            concat!(
                "server:\n  base_url: http://tasks.lan:8000\n",
                "polling:\n  interval_ms: 250\n  max_attempts: 40\n",
                "forms:\n  default_folder: /srv/media\n",
            ),
        );
        let config = TrackerConfig::load_with_env(Some(file.path()), no_env()).unwrap();

        assert_eq!(config.server.base_url, "http://tasks.lan:8000");
        let policy = config.polling.policy();
        assert_eq!(policy.interval, Duration::from_millis(250));
        assert_eq!(policy.max_attempts, Some(40));
        assert_eq!(policy.timeout, None);
        assert_eq!(config.forms.default_folder(), PathBuf::from("/srv/media"));
    }

    #[test]
    fn test_env_overrides_file() {
        let file = write_yaml("server:\n  base_url: http://tasks.lan:8000\n");
        let mut env = config::Map::new();
        env.insert(
            "MEGAWEB_SERVER__BASE_URL".to_string(),
            "http://other:9000".to_string(),
        );
        env.insert("MEGAWEB_POLLING__TIMEOUT_SECS".to_string(), "120".to_string());

        let config = TrackerConfig::load_with_env(Some(file.path()), Some(env)).unwrap();
        assert_eq!(config.server.base_url, "http://other:9000");
        assert_eq!(config.polling.timeout_secs, Some(120));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let result = TrackerConfig::load_with_env(
            Some(Path::new("/definitely/not/here/megaweb.yaml")),
            no_env(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_validation() {
        let mut config = TrackerConfig::default();
        assert!(config.validate().is_ok());

        config.polling.interval_ms = 0;
        assert!(config.validate().is_err());

        config.polling.interval_ms = 10;
        config.polling.max_attempts = Some(0);
        assert!(config.validate().is_err());

        config.polling.max_attempts = None;
        config.server.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_written_yaml_loads_back() {
        let mut config = TrackerConfig::default();
        config.polling.max_attempts = Some(5);
        config.forms.default_folder = Some(PathBuf::from("/srv/media"));
        let file = write_yaml(&config.to_yaml().unwrap());

        let loaded = TrackerConfig::load_with_env(Some(file.path()), no_env()).unwrap();
        assert_eq!(loaded, config);
    }
}
