//! telemetry.rs
//! Global tracing subscriber for the service binary.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// `RUST_LOG` wins over `level`. Audit events share the output under the `audit` target.
pub fn init_tracing(level: &str, json: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json().with_current_span(false)).try_init()?;
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()?;
    }
    Ok(())
}
