use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, SrtransError};

/// External command invoked on behalf of the translation engine
#[derive(Debug, Clone)]
pub struct EngineCommand {
    pub binary_path: String,
    pub args: Vec<OsString>,
    pub envs: Vec<(String, OsString)>,
    pub description: String,
}

impl EngineCommand {
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, description: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            args: Vec::new(),
            envs: Vec::new(),
            description: description.into(),
        }
    }

    /// Add an argument
    pub fn arg<S: Into<OsString>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add a path argument
    pub fn path_arg<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg(path.as_ref().as_os_str())
    }

    /// Set an environment variable for the child process
    pub fn env<K: Into<String>, V: Into<OsString>>(mut self, key: K, value: V) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Run the command and return its stdout
    pub async fn execute(&self) -> Result<String> {
        debug!("Executing command: {} {:?}", self.binary_path, self.args);
        debug!("Description: {}", self.description);

        let mut cmd = Command::new(&self.binary_path);
        cmd.args(&self.args);
        for (key, value) in &self.envs {
            cmd.env(key, value);
        }

        let output = cmd.output().await.map_err(|e| {
            SrtransError::Command(format!("Failed to execute {}: {}", self.binary_path, e))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SrtransError::Command(format!(
                "{} failed ({}): {}",
                self.description,
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Builds the commands the Argos engine relies on
#[derive(Debug, Clone)]
pub struct EngineCommandBuilder {
    translate_binary: String,
    unzip_binary: String,
    packages_dir: PathBuf,
}

impl EngineCommandBuilder {
    pub fn new<P: Into<PathBuf>>(translate_binary: &str, unzip_binary: &str, packages_dir: P) -> Self {
        Self {
            translate_binary: translate_binary.to_string(),
            unzip_binary: unzip_binary.to_string(),
            packages_dir: packages_dir.into(),
        }
    }

    /// Translate one piece of text with the installed packages
    pub fn translate(&self, text: &str, from_code: &str, to_code: &str) -> EngineCommand {
        EngineCommand::new(&self.translate_binary, format!("Translate {} -> {}", from_code, to_code))
            .env("ARGOS_PACKAGES_DIR", self.packages_dir.as_os_str())
            .arg("--from-lang")
            .arg(from_code)
            .arg("--to-lang")
            .arg(to_code)
            // dialogue lines often start with a dash
            .arg("--")
            .arg(text)
    }

    /// Extract a package archive into the packages directory
    pub fn extract_archive<P: AsRef<Path>>(&self, archive: P) -> EngineCommand {
        let archive = archive.as_ref();
        EngineCommand::new(&self.unzip_binary, format!("Install {}", archive.display()))
            .arg("-o")
            .arg("-q")
            .path_arg(archive)
            .arg("-d")
            .path_arg(&self.packages_dir)
    }
}
