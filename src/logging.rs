//! Diagnostic logging setup.
//!
//! Progress for humans goes through [`crate::output::Printer`]. Tracing
//! events carry the detail useful when something goes wrong: full tool
//! command lines, exit codes and stage transitions.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the stderr subscriber.
///
/// `-v` selects debug and `-vv` trace for this crate. Without either flag
/// `RUST_LOG` is honoured, falling back to warnings only.
pub fn init(verbosity: u8) {
    let filter = match verbosity {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("warn,loam_pack=debug"),
        _ => EnvFilter::new("warn,loam_pack=trace"),
    };

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}
