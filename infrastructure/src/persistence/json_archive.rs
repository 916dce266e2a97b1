//! JSON archive of agent results.
//!
//! A session's results are written as one pretty-printed JSON document so a
//! later run can resume them with `--resume`.

use chrono::{DateTime, Utc};
use muse_domain::{AgentResult, DomainError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Current archive format version.
pub const ARCHIVE_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Cannot access archive {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Archive {path} is not valid: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Archive {path} has unsupported version {version}")]
    UnsupportedVersion { path: PathBuf, version: u32 },

    #[error("Archive {path} contains an invalid result: {source}")]
    InvalidResult {
        path: PathBuf,
        #[source]
        source: DomainError,
    },
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArchiveFile {
    version: u32,
    saved_at: DateTime<Utc>,
    results: Vec<AgentResult>,
}

/// File-backed archive of [`AgentResult`]s.
pub struct JsonArchive {
    path: PathBuf,
}

impl JsonArchive {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `results`, replacing any previous archive at the path.
    ///
    /// Writes to a sibling temp file first and renames it into place.
    pub fn save(&self, results: &[AgentResult]) -> Result<(), ArchiveError> {
        let io_err = |source| ArchiveError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let file = ArchiveFile {
            version: ARCHIVE_VERSION,
            saved_at: Utc::now(),
            results: results.to_vec(),
        };
        let json = serde_json::to_string_pretty(&file).map_err(|source| ArchiveError::Format {
            path: self.path.clone(),
            source,
        })?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)?;

        info!("Saved {} results to {}", results.len(), self.path.display());
        Ok(())
    }

    /// Read the archive; every result is validated before it is returned.
    pub fn load(&self) -> Result<Vec<AgentResult>, ArchiveError> {
        let text = std::fs::read_to_string(&self.path).map_err(|source| ArchiveError::Io {
            path: self.path.clone(),
            source,
        })?;
        let file: ArchiveFile =
            serde_json::from_str(&text).map_err(|source| ArchiveError::Format {
                path: self.path.clone(),
                source,
            })?;

        if file.version != ARCHIVE_VERSION {
            return Err(ArchiveError::UnsupportedVersion {
                path: self.path.clone(),
                version: file.version,
            });
        }
        for result in &file.results {
            result
                .validate()
                .map_err(|source| ArchiveError::InvalidResult {
                    path: self.path.clone(),
                    source,
                })?;
        }

        info!(
            "Loaded {} results from {} (saved {})",
            file.results.len(),
            self.path.display(),
            file.saved_at.to_rfc3339()
        );
        Ok(file.results)
    }
}
