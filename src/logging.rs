//! Logging setup for embedding applications.
//!
//! The library itself only emits through the `log` facade; this module is
//! a convenience for front-ends that want the same defaults the reference
//! tooling uses. Level selection, in priority order:
//!
//! 1. `RUST_LOG` environment variable, if set
//! 2. `quiet` (errors only) or `verbose` (debug/trace)
//! 3. Info

use std::env;
use std::io::Write;

use env_logger::Builder;
use log::LevelFilter;

/// Initialize the process-wide logger from verbosity flags.
///
/// Call at most once, before the first log statement. `verbose` counts
/// `-v` occurrences (0 = info, 1 = debug, 2+ = trace); `quiet` wins over
/// `verbose`; `RUST_LOG` wins over both.
///
/// # Panics
///
/// Panics if a global logger was already installed.
pub fn init_logging(verbose: u8, quiet: bool) {
    let mut builder = Builder::new();

    if env::var("RUST_LOG").is_ok() {
        builder.parse_default_env();
    } else {
        builder.filter_level(level_for(verbose, quiet));
    }

    builder.format(move |buf, record| {
        let level = record.level();
        let style = buf.default_level_style(level);
        if verbose >= 1 {
            writeln!(
                buf,
                "{} {style}{:<5}{style:#} [{}] {}",
                buf.timestamp_seconds(),
                level,
                record.module_path().unwrap_or("unknown"),
                record.args()
            )
        } else {
            writeln!(buf, "{style}{:<5}{style:#} {}", level, record.args())
        }
    });

    builder.init();
}

fn level_for(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}
