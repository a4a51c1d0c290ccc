//! Per-root directory traversal honoring the filter policy.
//!
//! [`Walker`] iterates one root and yields the paths of regular files that
//! are eligible for fingerprinting: non-empty, not hidden (unless
//! configured), and passing the extension filters. Directories vetoed by
//! [`Filters::should_skip_dir`] are pruned with their whole subtree.
//! Symlinks are never followed.
//!
//! The walker owns no threads; concurrency across roots and fingerprint
//! work is the engine's job. A shared shutdown flag makes iteration stop
//! between entries.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::Error;
use crate::filters::Filters;

/// Depth-first traversal of a single root directory.
#[derive(Debug)]
pub struct Walker<'a> {
    root: PathBuf,
    filters: &'a Filters,
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl<'a> Walker<'a> {
    /// Create a walker for `root` under the given filter policy.
    #[must_use]
    pub fn new(root: &Path, filters: &'a Filters) -> Self {
        Self {
            root: root.to_path_buf(),
            filters,
            shutdown_flag: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// Once the flag is `true` the iterator returns `None` at the next
    /// entry boundary.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Walk the root, yielding eligible file paths.
    ///
    /// I/O failures (unreadable directories, vanished entries) are yielded
    /// as errors; iteration can continue past them, leaving the fatal/skip
    /// decision to the caller.
    #[must_use]
    pub fn walk(&self) -> WalkIter<'_> {
        WalkIter {
            walker: self,
            start: true,
            stack: Vec::new(),
        }
    }
}

/// Iterator state for [`Walker::walk`].
#[derive(Debug)]
pub struct WalkIter<'w> {
    walker: &'w Walker<'w>,
    start: bool,
    stack: Vec<(PathBuf, fs::ReadDir)>,
}

impl Iterator for WalkIter<'_> {
    type Item = Result<PathBuf, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.start {
            self.start = false;
            let root = &self.walker.root;
            match fs::read_dir(root) {
                Ok(iter) => self.stack.push((root.clone(), iter)),
                Err(e) => return Some(Err(Error::io(root, e))),
            }
        }

        loop {
            if self.walker.is_shutdown_requested() {
                log::debug!(
                    "walker: shutdown requested, abandoning {}",
                    self.walker.root.display()
                );
                return None;
            }

            let (dir, iter) = self.stack.last_mut()?;
            let entry = match iter.next() {
                Some(Ok(entry)) => entry,
                Some(Err(e)) => {
                    let dir = dir.clone();
                    return Some(Err(Error::io(&dir, e)));
                }
                None => {
                    self.stack.pop();
                    continue;
                }
            };

            let path = entry.path();
            let file_type = match entry.file_type() {
                Ok(t) => t,
                Err(e) => return Some(Err(Error::io(&path, e))),
            };

            if file_type.is_dir() {
                if self.walker.filters.should_skip_dir(&path) {
                    log::trace!("skipping directory: {}", path.display());
                    continue;
                }
                match fs::read_dir(&path) {
                    Ok(iter) => self.stack.push((path, iter)),
                    Err(e) => return Some(Err(Error::io(&path, e))),
                }
                continue;
            }

            // Symlinks, sockets, devices: not regular files, not our problem.
            if !file_type.is_file() {
                continue;
            }

            if self.walker.filters.should_skip_file(&path) {
                log::trace!("skipping file: {}", path.display());
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(m) => m,
                Err(e) => return Some(Err(Error::io(&path, e))),
            };
            if metadata.len() == 0 {
                log::trace!("skipping empty file: {}", path.display());
                continue;
            }

            return Some(Ok(path));
        }
    }
}
