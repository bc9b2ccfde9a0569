use anyhow::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "info,docpolish=debug,docpolish_server=debug,tower_http=info";

/// Installs the global subscriber and routes `log` records into it.
///
/// `RUST_LOG` overrides the default filter.
pub fn init_tracing(json: bool) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    if json {
        let subscriber = tracing_subscriber::registry().with(env_filter).with(
            fmt::layer()
                .json()
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        );
        tracing::subscriber::set_global_default(subscriber)
            .context("Failed to install tracing subscriber")?;
    } else {
        let subscriber = tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(true));
        tracing::subscriber::set_global_default(subscriber)
            .context("Failed to install tracing subscriber")?;
    }

    tracing_log::LogTracer::init().context("Failed to bridge log records")?;
    Ok(())
}
