//! Tracing subscriber setup

use moodtrack_core::{MoodTrackError, MoodTrackResult};
use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber for the whole process.
///
/// `RUST_LOG` takes precedence over `default_filter`. Calling this again, or
/// after the host installed its own subscriber, is a no-op.
pub fn init_logging(default_filter: &str) -> MoodTrackResult<()> {
    if tracing::dispatcher::has_been_set() {
        return Ok(());
    }

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter).map_err(|e| {
            MoodTrackError::InvalidConfiguration {
                message: format!("Invalid log filter '{}': {}", default_filter, e),
            }
        })?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| MoodTrackError::Initialization {
            reason: format!("Failed to install tracing subscriber: {}", e),
        })
}
