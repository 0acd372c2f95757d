use std::io::IsTerminal;

use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Installs the global fmt subscriber. `RUST_LOG` overrides the `info`
/// default. Keeps whatever subscriber is already installed.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr);

    if let Err(err) = Registry::default().with(filter).with(fmt_layer).try_init() {
        debug!("keeping the existing tracing subscriber: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_keeps_the_first_subscriber() {
        init_tracing();
        init_tracing();
        tracing::info!("still logging");
    }
}
