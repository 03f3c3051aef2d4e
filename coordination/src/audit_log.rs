//! Append-only debate log file.
//!
//! Each write opens the file, appends, flushes and closes it again; no
//! handle survives between calls. Missing parent directories are created.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuditLogError {
    #[error("failed to create log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write log file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Plain-text log sink for transitions, transcripts and verdicts.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `text` followed by a newline.
    pub fn append(&self, text: &str) -> Result<(), AuditLogError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| AuditLogError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let write_err = |source| AuditLogError::Write {
            path: self.path.clone(),
            source,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(write_err)?;
        writeln!(file, "{}", text).map_err(write_err)?;
        file.flush().map_err(write_err)?;
        Ok(())
    }
}
