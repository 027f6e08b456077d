// Translation engine abstraction
//
// The pipeline only talks to the `TranslationEngine` trait. The engine handle is
// built once per run by `EngineFactory` and passed down explicitly:
// - Argos: argospm package index, `.argosmodel` archives and the argos-translate CLI

pub mod argos;
pub mod commands;
pub mod http;
#[cfg(test)]
pub(crate) mod test_server;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

pub use commands::*;
use crate::config::Config;
use crate::error::Result;

/// Source and target language codes of one run
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LanguagePair {
    pub from_code: String,
    pub to_code: String,
}

impl LanguagePair {
    pub fn new<S1: Into<String>, S2: Into<String>>(from_code: S1, to_code: S2) -> Self {
        Self {
            from_code: from_code.into(),
            to_code: to_code.into(),
        }
    }

    pub fn matches(&self, from_code: &str, to_code: &str) -> bool {
        self.from_code == from_code && self.to_code == to_code
    }
}

impl fmt::Display for LanguagePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from_code, self.to_code)
    }
}

/// Entry of the remote package index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailablePackage {
    pub from_code: String,
    pub to_code: String,
    #[serde(default)]
    pub from_name: String,
    #[serde(default)]
    pub to_name: String,
    #[serde(default)]
    pub package_version: String,
    #[serde(rename = "type", default)]
    pub package_type: String,
    #[serde(default)]
    pub links: Vec<String>,
}

impl AvailablePackage {
    pub fn pair(&self) -> LanguagePair {
        LanguagePair::new(&self.from_code, &self.to_code)
    }

    /// Archive file name used in the downloads directory
    pub fn archive_name(&self) -> String {
        format!("translate-{}_{}.argosmodel", self.from_code, self.to_code)
    }
}

/// Package found in the local packages directory
#[derive(Debug, Clone, PartialEq)]
pub struct InstalledPackage {
    pub from_code: String,
    pub to_code: String,
    pub package_version: String,
    pub path: PathBuf,
}

/// Capability set the pipeline needs from a translation backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranslationEngine: Send + Sync {
    /// Refresh the remote package index
    async fn update_index(&mut self) -> Result<()>;

    /// Packages known from the last index refresh, in index order
    fn available_packages(&self) -> Vec<AvailablePackage>;

    /// Fetch the archive of a package and return its local path
    async fn download(&self, package: &AvailablePackage) -> Result<PathBuf>;

    /// Install a downloaded package archive into local package state
    async fn install(&mut self, archive: &Path) -> Result<()>;

    /// Packages currently installed locally
    async fn installed_packages(&self) -> Result<Vec<InstalledPackage>>;

    /// Translate a single piece of text
    async fn translate(&self, text: &str, pair: &LanguagePair) -> Result<String>;
}

/// Engine implementation type
#[derive(Debug, Clone)]
pub enum EngineImplementation {
    Argos,
}

/// Factory for creating engine instances
pub struct EngineFactory;

impl EngineFactory {
    pub fn create_engine(
        implementation: EngineImplementation,
        config: &Config,
    ) -> Result<Box<dyn TranslationEngine>> {
        match implementation {
            EngineImplementation::Argos => Ok(Box::new(argos::ArgosEngine::new(
                config.engine.clone(),
                &config.network,
            )?)),
        }
    }

    pub fn create_default(config: &Config) -> Result<Box<dyn TranslationEngine>> {
        Self::create_engine(EngineImplementation::Argos, config)
    }
}
