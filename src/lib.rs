//! srtrans - SRT Subtitle Translation
//!
//! Translates the text lines of a SubRip file through a locally provisioned
//! translation package, keeping index, timestamp and blank lines untouched and
//! streaming JSON progress events for a calling process.

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod progress;
pub mod provision;
pub mod subtitle;
pub mod translate;
pub mod workflow;
