use std::io::Write;
use tracing::{debug, info, warn};

use crate::engine::{LanguagePair, TranslationEngine};
use crate::error::Result;
use crate::progress::{ProgressReporter, STATUS_TRANSLATING};
use crate::subtitle::LineKind;
use super::ProgressSchedule;

/// Counts gathered while translating one file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranslationStats {
    pub translated: usize,
    pub fallbacks: usize,
    pub passthrough: usize,
}

/// Translates SRT lines one at a time through the engine handle it is given
pub struct SimpleTranslator<'a> {
    engine: &'a dyn TranslationEngine,
    pair: &'a LanguagePair,
}

impl<'a> SimpleTranslator<'a> {
    pub fn new(engine: &'a dyn TranslationEngine, pair: &'a LanguagePair) -> Self {
        Self { engine, pair }
    }

    /// Translate the stripped content of a text line, terminated with `\n`
    pub async fn translate_text_line(&self, line: &str) -> Result<String> {
        let translated = self.engine.translate(line.trim(), self.pair).await?;
        Ok(format!("{}\n", translated))
    }

    /// Produce one output line per input line, reporting progress on the way
    pub async fn translate_lines<W: Write>(
        &self,
        lines: &[String],
        reporter: &mut ProgressReporter<W>,
    ) -> Result<(Vec<String>, TranslationStats)> {
        info!("Starting translation of {} lines ({})", lines.len(), self.pair);

        let schedule = ProgressSchedule::new(lines.len());
        let mut output = Vec::with_capacity(lines.len());
        let mut stats = TranslationStats::default();

        for (idx, line) in lines.iter().enumerate() {
            if schedule.should_report(idx) {
                reporter.report(schedule.percent(idx), STATUS_TRANSLATING)?;
            }

            let kind = LineKind::classify(line);
            if !kind.is_text() {
                stats.passthrough += 1;
                output.push(line.clone());
                continue;
            }

            match self.translate_text_line(line).await {
                Ok(translated) => {
                    debug!("Line {}: {:?} -> {:?}", idx + 1, line.trim(), translated.trim_end());
                    stats.translated += 1;
                    output.push(translated);
                }
                Err(e) => {
                    // keep the original line, terminator included
                    warn!("Line {} left untranslated: {}", idx + 1, e);
                    stats.fallbacks += 1;
                    output.push(line.clone());
                }
            }
        }

        debug!(
            "Translation finished: {} translated, {} kept after failure, {} passed through",
            stats.translated, stats.fallbacks, stats.passthrough
        );
        Ok((output, stats))
    }
}
