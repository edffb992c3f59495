use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Initialize tracing on stderr so log lines stay out of the prompt output.
/// Defaults to WARN; override with `RUST_LOG` (e.g. `RUST_LOG=monarch_review=debug`).
pub fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    Ok(())
}
