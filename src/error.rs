//! Error types shared across the discovery pipeline.

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

/// Errors produced by a discovery run.
///
/// Only the first error encountered is returned from [`collect`](crate::collect)
/// or [`stream`](crate::stream); later errors are logged and dropped while the
/// pipeline winds down.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Sentinel by which a key generator declines a file without failing
    /// the run. Filtered out at the fingerprint-task boundary; never
    /// surfaces to the caller.
    #[error("file skipped by key generator")]
    SkipFile,

    /// An I/O error while walking a directory or reading a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// `ffprobe` could not be spawned, typically because it is not on `PATH`.
    #[error("failed to run ffprobe for {path}: {source}")]
    FfprobeSpawn {
        /// File being probed
        path: PathBuf,
        /// The underlying spawn error
        #[source]
        source: io::Error,
    },

    /// `ffprobe` ran but exited with a nonzero status.
    #[error("ffprobe exited with {status} for {path}")]
    FfprobeFailed {
        /// File being probed
        path: PathBuf,
        /// Exit status reported by the process
        status: ExitStatus,
    },
}

impl Error {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Check whether this is the cooperative [`Error::SkipFile`] sentinel.
    #[must_use]
    pub fn is_skip(&self) -> bool {
        matches!(self, Self::SkipFile)
    }
}
