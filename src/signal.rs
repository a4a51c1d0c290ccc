//! OS-signal integration for graceful shutdown.
//!
//! The pipeline itself only ever sees a monotonic `Arc<AtomicBool>`; this
//! module is the isolated adapter that connects SIGINT/SIGTERM to that
//! flag. Install the handler once at startup and share the flag through
//! [`Config::with_shutdown_flag`](crate::Config::with_shutdown_flag):
//!
//! ```rust,no_run
//! use dupescan::{install_handler, Config};
//!
//! let handler = install_handler().expect("failed to install signal handler");
//! let config = Config::default()
//!     .with_root(".")
//!     .with_shutdown_flag(handler.shutdown_flag());
//! let (dupes, _result) = dupescan::collect(config);
//! if handler.is_shutdown_requested() {
//!     eprintln!("scan interrupted, partial results: {} paths", dupes.len());
//! }
//! ```
//!
//! Cancellation is cooperative: workers finish their current file before
//! observing the flag, so a single ctrl-c stops the run *soon*, not
//! instantly.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Conventional exit code after an interrupt (128 + SIGINT).
pub const EXIT_CODE_INTERRUPTED: i32 = 130;

/// Owner of the shutdown flag consulted by walkers and fingerprint tasks.
///
/// Clones share the same flag; once set it is never cleared during a run.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandler {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandler {
    /// Create a handler whose flag is initially unset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether shutdown has been requested.
    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Request a shutdown without an OS signal.
    pub fn request_shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// The shared flag, for handing to [`Config`](crate::Config).
    #[must_use]
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }

    /// Clear the flag again. Only useful between runs in tests.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Failure to hook the process signal handler.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// The underlying handler registration failed.
    #[error("failed to install signal handler: {0}")]
    InstallFailed(#[from] ctrlc::Error),
}

static GLOBAL_HANDLER: OnceLock<ShutdownHandler> = OnceLock::new();

/// Install a SIGINT/SIGTERM handler that sets the shutdown flag.
///
/// The handler is process-global and installed at most once; repeated
/// calls (and parallel tests) get the already-installed handler back with
/// its flag reset. When another component has already claimed the process
/// signal hook, an unhooked handler is returned so callers can still
/// drive shutdown via [`ShutdownHandler::request_shutdown`].
pub fn install_handler() -> Result<ShutdownHandler, SignalError> {
    if let Some(handler) = GLOBAL_HANDLER.get() {
        handler.reset();
        return Ok(handler.clone());
    }

    let handler = ShutdownHandler::new();
    let flag = handler.shutdown_flag();

    match ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
        log::info!("shutdown signal received");
    }) {
        Ok(()) => {
            let _ = GLOBAL_HANDLER.set(handler.clone());
            Ok(handler)
        }
        Err(_) => {
            if let Some(handler) = GLOBAL_HANDLER.get() {
                handler.reset();
                return Ok(handler.clone());
            }
            log::debug!("signal handler already registered elsewhere, using unhooked handler");
            let fallback = ShutdownHandler::new();
            let _ = GLOBAL_HANDLER.set(fallback.clone());
            Ok(fallback)
        }
    }
}
