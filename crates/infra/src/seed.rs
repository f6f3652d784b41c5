//! Seed asset: the canonical list of bead codes.
//!
//! Plain text, one code per line. Blank lines are ignored and surrounding
//! whitespace is trimmed.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed asset {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// File-backed seed source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedSource {
    path: PathBuf,
}

impl SeedSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_present(&self) -> bool {
        self.path.is_file()
    }

    /// Codes in file order, or `None` when the asset does not exist.
    pub fn read_codes(&self) -> Result<Option<Vec<String>>, SeedError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(parse_codes(&text))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(SeedError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

/// Split seed text into codes (trimmed, blanks dropped, order kept).
pub fn parse_codes(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
