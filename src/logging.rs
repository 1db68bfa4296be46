//! Console logging for binaries.
//!
//! The library only emits `tracing` events. Call [`init_logging`] once from `main` to print
//! them; without a subscriber (e.g. in tests) training is silent.

use tracing::Level;
use tracing::subscriber::{self, SetGlobalDefaultError};

/// Install a compact stdout subscriber at `level` as the global default.
pub fn init_logging_with_level(level: Level) -> Result<(), SetGlobalDefaultError> {
    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_target(false)
        .with_max_level(level)
        .with_writer(std::io::stdout)
        .finish();
    subscriber::set_global_default(subscriber)
}

/// Install the default (info level) subscriber.
pub fn init_logging() -> Result<(), SetGlobalDefaultError> {
    init_logging_with_level(Level::INFO)
}
