//! Log subscriber setup for binaries and tests

use tracing::Level;
use tracing_subscriber::fmt;

/// Install a fmt subscriber at `level`. Later calls are no-ops.
pub fn init_logging(level: Level) {
    let _ = fmt().with_max_level(level).with_target(false).try_init();
}
