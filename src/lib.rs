//! dupescan - concurrent duplicate-file discovery
//!
//! Walks one or more directory trees in parallel, derives a pluggable
//! *fingerprint* from each eligible file, and reports groups of paths
//! sharing a fingerprint as duplicates. Designed to be embedded: batch
//! consumers call [`collect`], streaming consumers call [`stream`] with
//! their own output channel and receive duplicate chunks as they form.
//!
//! ```no_run
//! use dupescan::{Config, Filters, KeyGenerator};
//!
//! let config = Config::default()
//!     .with_root("/data/photos")
//!     .with_root("/backup/photos")
//!     .with_filters(Filters {
//!         ext_include: vec!["jpg".into(), "png".into()],
//!         ..Default::default()
//!     })
//!     .with_key_generator(KeyGenerator::Sha256Full);
//!
//! let (dupes, result) = dupescan::collect(config);
//! result.expect("scan failed");
//! for path in dupes {
//!     println!("{}", path.display());
//! }
//! ```
//!
//! Streaming mode emits a two-path chunk when a fingerprint first turns
//! out to be duplicated and one-path chunks for every further hit, so
//! concatenating all chunks loses nothing:
//!
//! ```no_run
//! use dupescan::Config;
//!
//! let (tx, rx) = crossbeam_channel::bounded(16);
//! std::thread::spawn(move || dupescan::stream(Config::default(), tx));
//! for chunk in rx {
//!     for path in chunk {
//!         println!("dupe: {}", path.display());
//!     }
//! }
//! ```

pub mod config;
pub mod error;
pub mod filters;
pub mod keygen;
pub mod logging;
pub mod signal;
pub mod walker;

mod aggregator;
mod engine;

pub use config::Config;
pub use engine::{collect, stream};
pub use error::Error;
pub use filters::{parse_list, Filters};
pub use keygen::KeyGenerator;
pub use signal::{install_handler, ShutdownHandler};

// Channel types appearing in the public `stream` signature.
pub use crossbeam_channel::{Receiver, Sender};
