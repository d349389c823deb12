use tracing::Level;

/// Installs the global `tracing` subscriber, writing human-readable logs to stdout.
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init(level: Level) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init();
}
