use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the stderr subscriber.
///
/// Filters come from `SHEAF_LOG`, then `RUST_LOG`, e.g.
/// `SHEAF_LOG=sheaf_core=trace`. Nothing is installed when neither is set
/// and `verbose` is off, so normal runs print only their result.
pub(crate) fn init(verbose: bool) {
    let from_env = std::env::var("SHEAF_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok();

    let filter = match (from_env, verbose) {
        (Some(directives), _) => EnvFilter::new(directives),
        (None, true) => EnvFilter::new("debug"),
        (None, false) => return,
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true),
        )
        .with(filter)
        .init();
}
