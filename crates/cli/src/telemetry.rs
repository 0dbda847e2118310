//! Logging setup.
//!
//! Logs go to stderr so stdout stays reserved for command output.

use anyhow::{Context, Result};
use tracing::{Level, Subscriber};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

/// Initialize the global subscriber.
///
/// `RUST_LOG` selects the filter when set; otherwise only warnings and
/// errors are shown. `verbose` raises the default level to debug.
pub fn init_tracing(json_format: bool, verbose: bool) -> Result<()> {
    let mut env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    if verbose {
        env_filter = env_filter.add_directive(Level::DEBUG.into());
    }

    let registry = Registry::default().with(env_filter);

    if json_format {
        registry
            .with(json_layer())
            .try_init()
            .context("Failed to initialize tracing subscriber")?;
    } else {
        registry
            .with(text_layer())
            .try_init()
            .context("Failed to initialize tracing subscriber")?;
    }

    Ok(())
}

fn json_layer<S>() -> impl Layer<S>
where
    S: Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .json()
        .with_writer(std::io::stderr)
        .with_current_span(true)
        .with_thread_ids(true)
        .with_target(true)
        .with_level(true)
}

fn text_layer<S>() -> impl Layer<S>
where
    S: Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
}
