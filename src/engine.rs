//! Run coordinator: wires walkers, fingerprint workers and the aggregator
//! into one bounded pipeline.
//!
//! # Topology
//!
//! One walker thread per root enumerates eligible files into a bounded job
//! channel; `workers` fingerprint threads drain it, derive keys, and push
//! (key, path) pairs into a bounded pair channel; a single aggregator
//! thread turns pairs into duplicate chunks on the output channel. Both
//! intermediate channels have capacity `workers`, so a slow consumer
//! applies backpressure all the way back to directory enumeration.
//!
//! # Shutdown
//!
//! The shutdown flag is monotonic. It is set by the signal adapter (see
//! [`crate::signal`]) or internally on the first fatal error. Walkers stop
//! enqueuing at the next entry boundary; fingerprint workers keep draining
//! the job channel but stop producing pairs; the aggregator drains the
//! pair channel to completion. Every channel is closed by its producers
//! dropping their senders after quiescing, so the caller's receive loop
//! always terminates.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use crossbeam_channel::{bounded, Receiver, Sender};

use crate::aggregator::{Aggregator, Pair};
use crate::config::Config;
use crate::error::Error;
use crate::keygen::KeyGenerator;
use crate::walker::Walker;

/// Run the pipeline to completion and return every duplicate path found.
///
/// Paths are grouped by arrival: for each duplicated fingerprint the
/// result holds its paths in observation order, though the relative order
/// of groups is unspecified. On error the accumulated paths collected
/// before the failure are still returned alongside it.
pub fn collect(config: Config) -> (Vec<PathBuf>, Result<(), Error>) {
    let (out_tx, out_rx) = bounded::<Vec<PathBuf>>(1);
    let mut dupes = Vec::new();

    let result = thread::scope(|s| {
        let pipeline = s.spawn(move || run_pipeline(config, out_tx));
        for chunk in out_rx {
            dupes.extend(chunk);
        }
        match pipeline.join() {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    });

    (dupes, result)
}

/// Run the pipeline, streaming duplicate chunks to `out` as they form.
///
/// The first chunk for a fingerprint carries two paths, later chunks for
/// the same fingerprint one each; concatenation is lossless. Blocks until
/// the run finishes and always drops `out`, so the caller's receive loop
/// terminates even on error or shutdown. The caller must keep receiving
/// while this runs (typically from another thread).
pub fn stream(config: Config, out: Sender<Vec<PathBuf>>) -> Result<(), Error> {
    run_pipeline(config, out)
}

fn run_pipeline(config: Config, out: Sender<Vec<PathBuf>>) -> Result<(), Error> {
    let config = config.with_defaults();
    log::debug!("starting duplicate scan: {config}");

    let shutdown = config
        .shutdown_flag
        .clone()
        .unwrap_or_else(|| Arc::new(AtomicBool::new(false)));
    let workers = config.workers.max(1);

    let (job_tx, job_rx) = bounded::<PathBuf>(workers);
    let (pair_tx, pair_rx) = bounded::<Pair>(workers);
    let errors = ErrorSink::new(Arc::clone(&shutdown), config.halt_on_error);

    let config = &config;
    let shutdown = &shutdown;
    let errors_ref = &errors;

    thread::scope(|s| {
        s.spawn(move || Aggregator::new().run(pair_rx, out));

        for _ in 0..workers {
            let jobs = job_rx.clone();
            let pairs = pair_tx.clone();
            s.spawn(move || {
                fingerprint_worker(&jobs, &pairs, &config.key_generator, shutdown, errors_ref);
            });
        }
        drop(job_rx);
        drop(pair_tx);

        for root in &config.roots {
            let jobs = job_tx.clone();
            s.spawn(move || walk_root(root, &jobs, config, shutdown, errors_ref));
        }
        drop(job_tx);
    });

    let result = errors.into_first();
    match &result {
        Ok(()) => log::debug!("duplicate scan finished"),
        Err(e) => log::debug!("duplicate scan failed: {e}"),
    }
    result
}

/// Walk one root, submitting eligible files to the job channel.
///
/// The submit blocks while the worker budget is saturated; that is the
/// walker's backpressure.
fn walk_root(
    root: &Path,
    jobs: &Sender<PathBuf>,
    config: &Config,
    shutdown: &Arc<AtomicBool>,
    errors: &ErrorSink,
) {
    log::debug!("walking root {}", root.display());
    let walker = Walker::new(root, &config.filters).with_shutdown_flag(Arc::clone(shutdown));
    for entry in walker.walk() {
        match entry {
            Ok(path) => {
                if jobs.send(path).is_err() {
                    return;
                }
            }
            Err(err) => errors.record(err),
        }
    }
}

/// Drain the job channel, fingerprinting each file and publishing pairs.
///
/// After shutdown the worker keeps consuming jobs without processing
/// them, so a walker blocked on a full job channel can always finish.
fn fingerprint_worker(
    jobs: &Receiver<PathBuf>,
    pairs: &Sender<Pair>,
    key_generator: &KeyGenerator,
    shutdown: &Arc<AtomicBool>,
    errors: &ErrorSink,
) {
    for path in jobs {
        if shutdown.load(Ordering::SeqCst) {
            continue;
        }

        match key_generator.key_for(&path) {
            Ok(key) if key.is_empty() => {
                // Empty key with no error: the generator opted out.
                log::trace!("empty key, dropping {}", path.display());
            }
            Ok(key) => {
                if pairs.send(Pair { key, path }).is_err() {
                    return;
                }
            }
            Err(Error::SkipFile) => {
                log::trace!("key generator skipped {}", path.display());
            }
            Err(err) => errors.record(err),
        }
    }
}

/// Collects the run's first error and trips the shutdown flag.
///
/// With `halt` unset, I/O-style errors are demoted to warnings and the
/// run continues.
struct ErrorSink {
    first: Mutex<Option<Error>>,
    shutdown: Arc<AtomicBool>,
    halt: bool,
}

impl ErrorSink {
    fn new(shutdown: Arc<AtomicBool>, halt: bool) -> Self {
        Self {
            first: Mutex::new(None),
            shutdown,
            halt,
        }
    }

    fn record(&self, err: Error) {
        if !self.halt {
            log::warn!("continuing past error: {err}");
            return;
        }

        if let Ok(mut slot) = self.first.lock() {
            if slot.is_none() {
                log::error!("aborting scan: {err}");
                *slot = Some(err);
            } else {
                log::debug!("suppressing error during wind-down: {err}");
            }
        }
        self.shutdown.store(true, Ordering::SeqCst);
    }

    fn into_first(self) -> Result<(), Error> {
        match self.first.into_inner() {
            Ok(Some(err)) => Err(err),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_sink_keeps_first_error() {
        let flag = Arc::new(AtomicBool::new(false));
        let sink = ErrorSink::new(Arc::clone(&flag), true);

        sink.record(Error::io(
            Path::new("/first"),
            io::Error::from(io::ErrorKind::NotFound),
        ));
        sink.record(Error::io(
            Path::new("/second"),
            io::Error::from(io::ErrorKind::PermissionDenied),
        ));

        assert!(flag.load(Ordering::SeqCst));
        let err = sink.into_first().unwrap_err();
        assert!(err.to_string().contains("/first"));
    }

    #[test]
    fn test_error_sink_demotes_when_not_halting() {
        let flag = Arc::new(AtomicBool::new(false));
        let sink = ErrorSink::new(Arc::clone(&flag), false);

        sink.record(Error::io(
            Path::new("/x"),
            io::Error::from(io::ErrorKind::NotFound),
        ));

        assert!(!flag.load(Ordering::SeqCst));
        assert!(sink.into_first().is_ok());
    }
}
