use tracing::info;

use crate::config::ProvisionConfig;
use crate::engine::{AvailablePackage, LanguagePair, TranslationEngine};
use crate::error::{Result, SrtransError};

/// Makes sure a package for the requested pair is installed before translating
pub struct Provisioner {
    config: ProvisionConfig,
}

impl Provisioner {
    pub fn new(config: ProvisionConfig) -> Self {
        Self { config }
    }

    /// Refresh the index, pick the first matching package, download and install it
    pub async fn ensure_package(
        &self,
        engine: &mut dyn TranslationEngine,
        pair: &LanguagePair,
    ) -> Result<()> {
        info!("Provisioning translation package {}", pair);

        if self.config.skip_if_installed && self.is_installed(engine, pair).await? {
            info!("Package {} already installed, skipping install", pair);
            return Ok(());
        }

        engine.update_index().await?;

        let package = select_package(&engine.available_packages(), pair)?;
        info!(
            "Selected package {} (version {})",
            package.pair(),
            if package.package_version.is_empty() { "unknown" } else { package.package_version.as_str() }
        );

        let archive = engine.download(&package).await?;
        engine.install(&archive).await?;

        info!("Translation package {} ready", pair);
        Ok(())
    }

    async fn is_installed(&self, engine: &dyn TranslationEngine, pair: &LanguagePair) -> Result<bool> {
        let installed = engine.installed_packages().await?;
        Ok(installed.iter().any(|p| pair.matches(&p.from_code, &p.to_code)))
    }
}

/// First index entry whose codes match exactly; index order decides ties
pub fn select_package(packages: &[AvailablePackage], pair: &LanguagePair) -> Result<AvailablePackage> {
    packages
        .iter()
        .find(|p| pair.matches(&p.from_code, &p.to_code))
        .cloned()
        .ok_or_else(|| SrtransError::PackageNotFound {
            from: pair.from_code.clone(),
            to: pair.to_code.clone(),
        })
}
