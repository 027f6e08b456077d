use std::io::Write;
use std::path::PathBuf;
use tracing::{error, info};

use crate::config::Config;
use crate::engine::{LanguagePair, TranslationEngine};
use crate::error::Result;
use crate::progress::{
    ProgressReporter, STATUS_COMPLETED, STATUS_PACKAGE_READY, STATUS_STARTING, STATUS_WRITING,
};
use crate::provision::Provisioner;
use crate::subtitle::{read_srt_lines, write_srt_lines};
use crate::translate::{
    COMPLETED_PERCENT, PROVISIONED_PERCENT, SimpleTranslator, TranslationStats, WRITING_PERCENT,
};

/// Process exit status of a successful run
pub const EXIT_SUCCESS: u8 = 0;
/// Process exit status of any failed run
pub const EXIT_FAILURE: u8 = 1;

/// One `input -> output` translation job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    pub pair: LanguagePair,
}

/// Provision, translate, write: the whole run over one engine handle
pub struct Workflow {
    provisioner: Provisioner,
    engine: Box<dyn TranslationEngine>,
}

impl Workflow {
    pub fn new(config: &Config, engine: Box<dyn TranslationEngine>) -> Self {
        Self {
            provisioner: Provisioner::new(config.provision.clone()),
            engine,
        }
    }

    pub async fn run<W: Write>(
        &mut self,
        request: &RunRequest,
        reporter: &mut ProgressReporter<W>,
    ) -> Result<TranslationStats> {
        info!(
            "Translating {} -> {} ({})",
            request.input.display(),
            request.output.display(),
            request.pair
        );
        reporter.report(0.0, STATUS_STARTING)?;

        self.provisioner
            .ensure_package(self.engine.as_mut(), &request.pair)
            .await?;
        reporter.report(PROVISIONED_PERCENT, STATUS_PACKAGE_READY)?;

        let lines = read_srt_lines(&request.input).await?;
        let translator = SimpleTranslator::new(self.engine.as_ref(), &request.pair);
        let (translated, stats) = translator.translate_lines(&lines, reporter).await?;

        reporter.report(WRITING_PERCENT, STATUS_WRITING)?;
        write_srt_lines(&request.output, &translated).await?;
        reporter.report(COMPLETED_PERCENT, STATUS_COMPLETED)?;

        info!("Wrote translated subtitles to {}", request.output.display());
        Ok(stats)
    }

    /// Run the job and turn any failure into a single error event
    pub async fn execute<W: Write>(
        &mut self,
        request: &RunRequest,
        reporter: &mut ProgressReporter<W>,
    ) -> u8 {
        match self.run(request, reporter).await {
            Ok(stats) => {
                info!(
                    "Run finished: {} lines translated, {} kept after failures, {} passed through",
                    stats.translated, stats.fallbacks, stats.passthrough
                );
                EXIT_SUCCESS
            }
            Err(e) => {
                error!("Translation run failed: {}", e);
                if let Err(report_err) = reporter.report_error(e.to_string()) {
                    error!("Failed to report error event: {}", report_err);
                }
                EXIT_FAILURE
            }
        }
    }
}
