use regex::Regex;
use std::io::Write;
use std::path::Path;
use std::sync::LazyLock;
use tokio::fs;
use tracing::{debug, info};

use crate::error::{Result, SrtransError};

static INDEX_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+$").expect("index pattern is valid"));

// `\r\n` before `\r` so CRLF stays one terminator; the last alternative catches an unterminated tail
static RAW_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^\r\n]*(?:\r\n|\r|\n)|[^\r\n]+\z").expect("line pattern is valid")
});

const TIMESTAMP_SEPARATOR: &str = "-->";

/// Role of a single SRT line, decided from the line alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Index,
    Timestamp,
    Text,
    Blank,
}

impl LineKind {
    pub fn classify(line: &str) -> Self {
        let trimmed = line.trim();

        if INDEX_LINE.is_match(trimmed) {
            Self::Index
        } else if line.contains(TIMESTAMP_SEPARATOR) {
            Self::Timestamp
        } else if !trimmed.is_empty() {
            Self::Text
        } else {
            Self::Blank
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text)
    }
}

/// Split file content into lines, each keeping its own terminator.
///
/// `\n`, `\r\n` and a lone `\r` all end a line.
pub fn split_lines(content: &str) -> Vec<String> {
    RAW_LINE
        .find_iter(content)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Read an SRT file as terminator-preserving lines
pub async fn read_srt_lines<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    info!("Reading SRT file: {}", path.display());

    if !fs::try_exists(path).await.unwrap_or(false) {
        return Err(SrtransError::FileNotFound(path.display().to_string()));
    }

    let content = fs::read_to_string(path).await?;
    let lines = split_lines(&content);
    debug!("Read {} lines from {}", lines.len(), path.display());
    Ok(lines)
}

/// Write all lines in one pass through a uniquely named sibling temp file persisted into place
pub async fn write_srt_lines<P: AsRef<Path>>(path: P, lines: &[String]) -> Result<()> {
    let path = path.as_ref();
    info!("Writing SRT file: {}", path.display());

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    // dropping the temp file on any error path removes it
    let mut temp = tempfile::Builder::new()
        .prefix(".srtrans-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    temp.write_all(lines.concat().as_bytes())?;
    temp.flush()?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(temp.path(), std::fs::Permissions::from_mode(0o644))?;
    }

    temp.persist(path).map_err(|e| SrtransError::Io(e.error))?;

    info!("SRT file written successfully");
    Ok(())
}
