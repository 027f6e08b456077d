// Line-by-line SRT translation
//
// - simple: classify each line, translate text lines, keep everything else verbatim
// - ProgressSchedule: which line positions report progress and at what percentage

pub mod simple;

pub use simple::*;

/// Progress reserved before the line loop starts (package provisioning)
pub const PROVISIONED_PERCENT: f64 = 5.0;
/// Share of the progress range covered by the line loop
pub const TRANSLATION_SPAN_PERCENT: f64 = 90.0;
/// Progress reported right before the output file is written
pub const WRITING_PERCENT: f64 = 95.0;
/// Progress of a finished run
pub const COMPLETED_PERCENT: f64 = 100.0;

/// Reports roughly ten evenly spaced updates over the line loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSchedule {
    total: usize,
    interval: usize,
}

impl ProgressSchedule {
    pub fn new(total: usize) -> Self {
        let interval = ((total as f64) / 10.0).round().max(1.0) as usize;
        Self { total, interval }
    }

    pub fn interval(&self) -> usize {
        self.interval
    }

    pub fn should_report(&self, position: usize) -> bool {
        position < self.total && position % self.interval == 0
    }

    pub fn percent(&self, position: usize) -> f64 {
        if self.total == 0 {
            return PROVISIONED_PERCENT;
        }
        (position as f64 / self.total as f64) * TRANSLATION_SPAN_PERCENT + PROVISIONED_PERCENT
    }
}
