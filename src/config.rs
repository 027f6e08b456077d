use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use crate::error::{Result, SrtransError};

/// Default config file looked up in the current directory
pub const DEFAULT_CONFIG_FILE: &str = "srtrans.toml";

const DEFAULT_INDEX_URL: &str =
    "https://raw.githubusercontent.com/argosopentech/argospm-index/main/index.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub network: NetworkConfig,
    pub provision: ProvisionConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// URL of the remote package index (argospm index format)
    pub index_url: String,
    /// Directory holding installed translation packages
    pub packages_dir: PathBuf,
    /// Directory where package archives are downloaded before install
    pub downloads_dir: PathBuf,
    /// Path to the argos-translate binary
    pub translate_binary: String,
    /// Path to the unzip binary used to install package archives
    pub unzip_binary: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Request timeout in seconds, 0 disables the timeout
    pub timeout_secs: u64,
    /// Extra attempts after a failed request
    pub retries: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvisionConfig {
    /// Skip the index refresh and install when the pair is already installed
    pub skip_if_installed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for the daily rolling log file
    pub log_dir: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from(".srtrans"))
            .join("argos-translate");
        let cache_dir = dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from(".srtrans"))
            .join("argos-translate");

        Self {
            index_url: DEFAULT_INDEX_URL.to_string(),
            packages_dir: data_dir.join("packages"),
            downloads_dir: cache_dir.join("downloads"),
            translate_binary: "argos-translate".to_string(),
            unzip_binary: "unzip".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from(".srtrans").join("log"),
        }
    }
}

impl NetworkConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SrtransError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| SrtransError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SrtransError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| SrtransError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Load the explicit config file, else `srtrans.toml` from the current
    /// directory, else the defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }
}
