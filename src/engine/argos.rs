use async_trait::async_trait;
use serde::Deserialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncReadExt;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::{EngineConfig, NetworkConfig};
use crate::error::{Result, SrtransError};
use super::http::HttpFetcher;
use super::{AvailablePackage, EngineCommandBuilder, InstalledPackage, LanguagePair, TranslationEngine};

const ZIP_MAGIC: [u8; 4] = *b"PK\x03\x04";

/// `metadata.json` shipped inside every installed package
#[derive(Debug, Deserialize)]
struct PackageMetadata {
    from_code: String,
    to_code: String,
    #[serde(default)]
    package_version: String,
}

/// Argos Translate backed engine
pub struct ArgosEngine {
    config: EngineConfig,
    fetcher: HttpFetcher,
    commands: EngineCommandBuilder,
    packages: Vec<AvailablePackage>,
}

impl ArgosEngine {
    pub fn new(config: EngineConfig, network: &NetworkConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(network)?;
        let commands = EngineCommandBuilder::new(
            &config.translate_binary,
            &config.unzip_binary,
            &config.packages_dir,
        );

        Ok(Self {
            config,
            fetcher,
            commands,
            packages: Vec::new(),
        })
    }

    async fn fetch_archive(&self, package: &AvailablePackage, dest: &Path) -> Result<()> {
        if package.links.is_empty() {
            return Err(SrtransError::Download(format!(
                "Package {} has no download links",
                package.pair()
            )));
        }

        let mut last_error = None;
        for link in &package.links {
            info!("Downloading {} package from {}", package.pair(), link);
            match self.fetcher.get_bytes(link).await {
                Ok(bytes) => {
                    let mut temp = tempfile::Builder::new()
                        .prefix(".download-")
                        .suffix(".tmp")
                        .tempfile_in(&self.config.downloads_dir)?;
                    temp.write_all(&bytes)?;
                    temp.persist(dest).map_err(|e| SrtransError::Io(e.error))?;
                    info!("Downloaded {} bytes to {}", bytes.len(), dest.display());
                    return Ok(());
                }
                Err(e) => {
                    warn!("Download from {} failed: {}", link, e);
                    last_error = Some(e);
                }
            }
        }

        Err(SrtransError::Download(format!(
            "All download links failed for {}: {}",
            package.pair(),
            last_error.map(|e| e.to_string()).unwrap_or_default()
        )))
    }
}

#[async_trait]
impl TranslationEngine for ArgosEngine {
    async fn update_index(&mut self) -> Result<()> {
        info!("Updating package index from {}", self.config.index_url);
        self.packages = self.fetcher.get_json(&self.config.index_url).await?;
        info!("Package index lists {} packages", self.packages.len());
        Ok(())
    }

    fn available_packages(&self) -> Vec<AvailablePackage> {
        self.packages.clone()
    }

    async fn download(&self, package: &AvailablePackage) -> Result<PathBuf> {
        fs::create_dir_all(&self.config.downloads_dir).await?;
        let dest = self.config.downloads_dir.join(package.archive_name());

        if fs::try_exists(&dest).await.unwrap_or(false) {
            info!("Package archive already downloaded at {}", dest.display());
            return Ok(dest);
        }

        self.fetch_archive(package, &dest).await?;
        Ok(dest)
    }

    async fn install(&mut self, archive: &Path) -> Result<()> {
        info!("Installing package archive {}", archive.display());

        let mut file = fs::File::open(archive).await.map_err(|e| {
            SrtransError::Install(format!("Cannot read {}: {}", archive.display(), e))
        })?;
        let mut header = [0u8; 4];
        let is_zip = file.read_exact(&mut header).await.is_ok() && header == ZIP_MAGIC;
        drop(file);

        if !is_zip {
            return Err(SrtransError::Install(format!(
                "{} is not a package archive",
                archive.display()
            )));
        }

        fs::create_dir_all(&self.config.packages_dir).await?;
        self.commands
            .extract_archive(archive)
            .execute()
            .await
            .map_err(|e| SrtransError::Install(e.to_string()))?;

        info!("Installed package into {}", self.config.packages_dir.display());
        Ok(())
    }

    async fn installed_packages(&self) -> Result<Vec<InstalledPackage>> {
        Ok(scan_installed_packages(&self.config.packages_dir))
    }

    async fn translate(&self, text: &str, pair: &LanguagePair) -> Result<String> {
        let output = self
            .commands
            .translate(text, &pair.from_code, &pair.to_code)
            .execute()
            .await
            .map_err(|e| SrtransError::Translation(e.to_string()))?;

        let translated = output.trim_end_matches(['\r', '\n']);
        if translated.trim().is_empty() {
            return Err(SrtransError::Translation(format!(
                "Empty translation received for \"{}\"",
                text
            )));
        }

        debug!("Translated \"{}\" -> \"{}\"", text, translated);
        Ok(translated.to_string())
    }
}

/// Collect packages described by `<packages_dir>/<package>/metadata.json`
pub fn scan_installed_packages(packages_dir: &Path) -> Vec<InstalledPackage> {
    let mut installed = Vec::new();

    for entry in WalkDir::new(packages_dir)
        .min_depth(2)
        .max_depth(2)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if entry.file_name() != "metadata.json" {
            continue;
        }

        let parsed = std::fs::read_to_string(entry.path())
            .ok()
            .and_then(|content| serde_json::from_str::<PackageMetadata>(&content).ok());

        match (parsed, entry.path().parent()) {
            (Some(meta), Some(dir)) => installed.push(InstalledPackage {
                from_code: meta.from_code,
                to_code: meta.to_code,
                package_version: meta.package_version,
                path: dir.to_path_buf(),
            }),
            _ => warn!("Skipping unreadable package metadata: {}", entry.path().display()),
        }
    }

    debug!("Found {} installed packages in {}", installed.len(), packages_dir.display());
    installed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::engine::test_server;

    fn engine_in(dir: &Path) -> ArgosEngine {
        let mut config = Config::default();
        config.engine.packages_dir = dir.join("packages");
        config.engine.downloads_dir = dir.join("downloads");
        ArgosEngine::new(config.engine, &config.network).unwrap()
    }

    fn write_metadata(packages_dir: &Path, name: &str, body: &str) {
        let dir = packages_dir.join(name);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("metadata.json"), body).unwrap();
    }

    #[test]
    fn test_scan_installed_packages() {
        let dir = tempfile::tempdir().unwrap();
        let packages = dir.path().join("packages");
        write_metadata(
            &packages,
            "translate-en_fr-1_9",
            r#"{"from_code": "en", "to_code": "fr", "package_version": "1.9"}"#,
        );
        write_metadata(&packages, "broken", "not json");

        let installed = scan_installed_packages(&packages);
        assert_eq!(installed.len(), 1);
        assert_eq!(installed[0].from_code, "en");
        assert_eq!(installed[0].to_code, "fr");
        assert_eq!(installed[0].package_version, "1.9");
        assert!(installed[0].path.ends_with("translate-en_fr-1_9"));
    }

    #[test]
    fn test_scan_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(scan_installed_packages(&dir.path().join("absent")).is_empty());
    }

    #[tokio::test]
    async fn test_download_reuses_existing_archive() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine_in(dir.path());
        let package: AvailablePackage =
            serde_json::from_str(r#"{"from_code": "en", "to_code": "fr"}"#).unwrap();

        let existing = dir.path().join("downloads").join(package.archive_name());
        std::fs::create_dir_all(existing.parent().unwrap()).unwrap();
        std::fs::write(&existing, b"PK\x03\x04").unwrap();

        // no links, so any network attempt would fail
        let path = engine.download(&package).await.unwrap();
        assert_eq!(path, existing);
    }

    #[tokio::test]
    async fn test_download_without_links_fails() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine_in(dir.path());
        let package: AvailablePackage =
            serde_json::from_str(r#"{"from_code": "en", "to_code": "fr"}"#).unwrap();

        assert!(matches!(
            engine.download(&package).await,
            Err(SrtransError::Download(_))
        ));
    }

    #[tokio::test]
    async fn test_download_falls_back_to_next_link() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine_in(dir.path());
        let (base_url, _) = test_server::serve(|_, path| match path {
            "/mirror/translate-en_fr.argosmodel" => (200, b"PK\x03\x04model".to_vec()),
            _ => (404, b"not found".to_vec()),
        })
        .await;
        let package: AvailablePackage = serde_json::from_value(serde_json::json!({
            "from_code": "en",
            "to_code": "fr",
            "links": [
                format!("{}/gone/translate-en_fr.argosmodel", base_url),
                format!("{}/mirror/translate-en_fr.argosmodel", base_url),
            ],
        }))
        .unwrap();

        let path = engine.download(&package).await.unwrap();

        let downloads = dir.path().join("downloads");
        assert_eq!(path, downloads.join("translate-en_fr.argosmodel"));
        assert_eq!(std::fs::read(&path).unwrap(), b"PK\x03\x04model");
        let names: Vec<_> = std::fs::read_dir(&downloads)
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("translate-en_fr.argosmodel")]);
    }

    #[tokio::test]
    async fn test_download_all_links_failing_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine_in(dir.path());
        let (base_url, hits) = test_server::serve(|_, _| (404, Vec::new())).await;
        let package: AvailablePackage = serde_json::from_value(serde_json::json!({
            "from_code": "en",
            "to_code": "fr",
            "links": [format!("{}/a", base_url), format!("{}/b", base_url)],
        }))
        .unwrap();

        assert!(matches!(
            engine.download(&package).await,
            Err(SrtransError::Download(_))
        ));
        assert_eq!(hits.load(std::sync::atomic::Ordering::SeqCst), 2);
        assert_eq!(std::fs::read_dir(dir.path().join("downloads")).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_update_index_lists_packages_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let (base_url, _) = test_server::serve(|_, _| {
            (
                200,
                br#"[
                    {"from_code": "en", "to_code": "de", "type": "translate"},
                    {"from_code": "en", "to_code": "fr", "package_version": "1.9", "links": ["x"]}
                ]"#
                .to_vec(),
            )
        })
        .await;
        let mut config = Config::default();
        config.engine.index_url = format!("{}/index.json", base_url);
        config.engine.packages_dir = dir.path().join("packages");
        config.engine.downloads_dir = dir.path().join("downloads");
        let mut engine = ArgosEngine::new(config.engine, &config.network).unwrap();

        assert!(engine.available_packages().is_empty());
        engine.update_index().await.unwrap();

        let packages = engine.available_packages();
        assert_eq!(packages.len(), 2);
        assert_eq!(packages[0].pair(), LanguagePair::new("en", "de"));
        assert_eq!(packages[1].package_version, "1.9");
        assert_eq!(packages[1].links, vec!["x".to_string()]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_install_runs_extractor_for_archive() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.engine.packages_dir = dir.path().join("packages");
        config.engine.downloads_dir = dir.path().join("downloads");
        // `true` accepts any arguments and exits 0
        config.engine.unzip_binary = "true".to_string();
        let mut engine = ArgosEngine::new(config.engine, &config.network).unwrap();
        let archive = dir.path().join("translate-en_fr.argosmodel");
        std::fs::write(&archive, b"PK\x03\x04rest").unwrap();

        engine.install(&archive).await.unwrap();

        assert!(dir.path().join("packages").is_dir());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_install_reports_extractor_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.engine.packages_dir = dir.path().join("packages");
        config.engine.unzip_binary = "false".to_string();
        let mut engine = ArgosEngine::new(config.engine, &config.network).unwrap();
        let archive = dir.path().join("translate-en_fr.argosmodel");
        std::fs::write(&archive, b"PK\x03\x04rest").unwrap();

        assert!(matches!(
            engine.install(&archive).await,
            Err(SrtransError::Install(_))
        ));
    }

    #[tokio::test]
    async fn test_install_rejects_non_archive() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine_in(dir.path());
        let bogus = dir.path().join("bogus.argosmodel");
        std::fs::write(&bogus, b"<html>not found</html>").unwrap();

        assert!(matches!(
            engine.install(&bogus).await,
            Err(SrtransError::Install(_))
        ));
    }

    #[tokio::test]
    async fn test_translate_with_missing_binary_is_translation_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.engine.translate_binary = "/nonexistent/argos-translate".to_string();
        config.engine.packages_dir = dir.path().join("packages");
        let engine = ArgosEngine::new(config.engine, &config.network).unwrap();

        let result = engine.translate("Hello", &LanguagePair::new("en", "fr")).await;
        assert!(matches!(result, Err(SrtransError::Translation(_))));
    }
}
