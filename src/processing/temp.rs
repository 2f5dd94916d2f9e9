//! Intermediate file allocation
//!
//! Every intermediate WAV is created with exclusive-create semantics under
//! a name made of a per-process run id and a random token, and is removed
//! when its [`TempWav`] goes away.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use log::{debug, warn};
use tempfile::NamedTempFile;
use crate::config::TempConfig;
use crate::error::Result;

const RANDOM_TOKEN_LEN: usize = 12;

/// Four hex characters, fixed for the lifetime of the process.
pub fn run_id() -> &'static str {
    static RUN_ID: OnceLock<String> = OnceLock::new();
    RUN_ID.get_or_init(|| format!("{:04x}", rand::random::<u16>()))
}

pub fn default_prefix() -> String {
    format!("monowav-{}-", run_id())
}

#[derive(Debug, Clone)]
pub struct TempFileFactory {
    dir: PathBuf,
    prefix: String,
}

impl TempFileFactory {
    pub fn new(config: &TempConfig) -> Self {
        Self {
            dir: config.dir.clone().unwrap_or_else(std::env::temp_dir),
            prefix: config.prefix.clone().unwrap_or_else(default_prefix),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Atomically create a new empty `.wav` file owned by the caller.
    pub fn create(&self) -> Result<TempWav> {
        let file = tempfile::Builder::new()
            .prefix(&self.prefix)
            .suffix(".wav")
            .rand_bytes(RANDOM_TOKEN_LEN)
            .tempfile_in(&self.dir)?;
        debug!("Allocated temp file {}", file.path().display());
        Ok(TempWav { file })
    }

    /// Files in the temp dir that carry this factory's prefix.
    pub fn leftovers(&self) -> Result<Vec<PathBuf>> {
        let mut found = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            if entry.file_name().to_string_lossy().starts_with(&self.prefix) {
                found.push(entry.path());
            }
        }
        found.sort();
        Ok(found)
    }
}

impl Default for TempFileFactory {
    fn default() -> Self {
        Self::new(&TempConfig::default())
    }
}

/// An intermediate file. Deleted on drop; [`TempWav::remove`] reports failures.
#[derive(Debug)]
pub struct TempWav {
    file: NamedTempFile,
}

impl TempWav {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn remove(self) {
        let path = self.file.path().to_path_buf();
        match self.file.close() {
            Ok(()) => debug!("Removed temp file {}", path.display()),
            Err(e) => warn!("Could not remove temp file {}: {}", path.display(), e),
        }
    }
}
