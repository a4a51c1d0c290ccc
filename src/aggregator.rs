//! Single-consumer deduplication state machine.
//!
//! The aggregator is the exclusive reader of the pair channel and the
//! exclusive writer of the output channel. Per fingerprint it retains at
//! most one path: the first observation is parked, the second emits a
//! two-path chunk and demotes the entry to a marker, and every later
//! observation emits a one-path continuation. Peak memory is therefore
//! O(distinct fingerprints), not O(files scanned).

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::mem;
use std::path::PathBuf;

use crossbeam_channel::{Receiver, Sender};

/// One fingerprint observation, produced by a fingerprint task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Pair {
    pub key: String,
    pub path: PathBuf,
}

/// Emission state for one fingerprint.
#[derive(Debug)]
enum KeyState {
    /// Exactly one path observed; parked until a duplicate shows up.
    FirstSeen(PathBuf),
    /// The group has been reported; further paths extend it.
    Emitted,
}

#[derive(Debug, Default)]
pub(crate) struct Aggregator {
    states: HashMap<String, KeyState>,
}

impl Aggregator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Consume pairs until the channel closes, sending duplicate chunks
    /// to `out`. Dropping `out` on return is the caller's end-of-results
    /// signal.
    ///
    /// If the output receiver goes away mid-run the aggregator keeps
    /// draining pairs without emitting, so producers blocked on the pair
    /// channel always get to finish.
    pub(crate) fn run(mut self, pairs: Receiver<Pair>, out: Sender<Vec<PathBuf>>) {
        let mut emitting = true;
        for pair in pairs {
            let Some(chunk) = self.observe(pair) else {
                continue;
            };
            if emitting && out.send(chunk).is_err() {
                emitting = false;
                log::debug!("output receiver dropped, draining remaining pairs");
            }
        }
        log::debug!(
            "aggregator done: {} distinct fingerprints observed",
            self.states.len()
        );
    }

    /// Apply one observation; returns the chunk to emit, if any.
    fn observe(&mut self, pair: Pair) -> Option<Vec<PathBuf>> {
        match self.states.entry(pair.key) {
            Entry::Vacant(slot) => {
                slot.insert(KeyState::FirstSeen(pair.path));
                None
            }
            Entry::Occupied(mut slot) => {
                match mem::replace(slot.get_mut(), KeyState::Emitted) {
                    KeyState::FirstSeen(first) => Some(vec![first, pair.path]),
                    KeyState::Emitted => Some(vec![pair.path]),
                }
            }
        }
    }

    #[cfg(test)]
    fn tracked_keys(&self) -> usize {
        self.states.len()
    }
}
