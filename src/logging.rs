use std::io::IsTerminal;
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

/// Install the stderr subscriber; `RUST_LOG` overrides the default level.
pub fn init(verbose: bool) {
    let default_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let log_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();
}
