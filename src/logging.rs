use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

const DEFAULT_FILTER: &str = "info";

/// Install a stderr subscriber filtered by `RUST_LOG`, defaulting to `info`.
///
/// Stdout is left to the progress line.
pub fn init() -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let with_ansi = !cfg!(windows);
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(with_ansi)
        .with_target(false);

    let collector = tracing_subscriber::registry().with(console_layer).with(filter);
    tracing::subscriber::set_global_default(collector)?;

    let log_var = match std::env::var("RUST_LOG") {
        Ok(var) => format!(" with RUST_LOG=\"{var}\""),
        Err(_) => String::new(),
    };
    tracing::debug!("Logging initiated to stderr{log_var}");
    Ok(())
}
