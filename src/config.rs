//! Run configuration for the discovery pipeline.

use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread;

use crate::filters::Filters;
use crate::keygen::KeyGenerator;

/// Immutable parameters for one discovery run.
///
/// Built by the caller, consumed once by [`collect`](crate::collect) or
/// [`stream`](crate::stream), and never mutated during the run. Roots are
/// expected to be sanitized (absolutized, tilde-expanded) by the caller.
///
/// # Example
///
/// ```no_run
/// use dupescan::{Config, KeyGenerator};
///
/// let config = Config::default()
///     .with_root("/data/media")
///     .with_key_generator(KeyGenerator::Sha256Full)
///     .with_workers(8);
/// let (dupes, result) = dupescan::collect(config);
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Directories to scan. Empty means the current directory.
    pub roots: Vec<PathBuf>,
    /// Inclusion/exclusion policy applied during traversal.
    pub filters: Filters,
    /// Fingerprint function deciding what makes two files duplicates.
    pub key_generator: KeyGenerator,
    /// Upper bound on concurrently executing fingerprint tasks.
    /// Zero means the platform's available parallelism.
    pub workers: usize,
    /// Whether an I/O error on one file aborts the whole run (the
    /// default). When `false`, such errors are logged at `warn` and the
    /// file is skipped.
    pub halt_on_error: bool,
    /// Externally owned shutdown flag, e.g. from
    /// [`install_handler`](crate::install_handler). When absent the
    /// engine creates a private one.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            filters: Filters::default(),
            key_generator: KeyGenerator::default(),
            workers: 0,
            halt_on_error: true,
            shutdown_flag: None,
        }
    }
}

impl Config {
    /// Create a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a root directory to scan.
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.roots.push(root.into());
        self
    }

    /// Replace the set of root directories.
    #[must_use]
    pub fn with_roots(mut self, roots: impl IntoIterator<Item = PathBuf>) -> Self {
        self.roots = roots.into_iter().collect();
        self
    }

    /// Set the filter policy.
    #[must_use]
    pub fn with_filters(mut self, filters: Filters) -> Self {
        self.filters = filters;
        self
    }

    /// Set the key generator.
    #[must_use]
    pub fn with_key_generator(mut self, key_generator: KeyGenerator) -> Self {
        self.key_generator = key_generator;
        self
    }

    /// Set the worker budget (0 = platform default).
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Choose whether a single-file I/O error fails the run.
    #[must_use]
    pub fn with_halt_on_error(mut self, halt: bool) -> Self {
        self.halt_on_error = halt;
        self
    }

    /// Share a shutdown flag with the run.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Fill unset fields with their defaults: the current directory as
    /// the sole root, and the platform parallelism as the worker budget.
    pub(crate) fn with_defaults(mut self) -> Self {
        if self.roots.is_empty() {
            log::info!("no roots specified, scanning the current directory");
            self.roots.push(PathBuf::from("."));
        }
        if self.workers == 0 {
            self.workers = default_workers();
        }
        self
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ roots: {:?}, key_generator: {}, workers: {}, halt_on_error: {}, filters: {} }}",
            self.roots, self.key_generator, self.workers, self.halt_on_error, self.filters,
        )
    }
}

/// Platform default for the worker budget.
fn default_workers() -> usize {
    thread::available_parallelism().map_or(1, usize::from)
}
