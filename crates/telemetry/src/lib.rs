//! Tracing subscriber bootstrap.

use bookshelf_kernel::settings::{LogFormat, TelemetrySettings};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` takes precedence over the
/// configured filter. Calling this more than once keeps the first subscriber.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&settings.log_filter)
            .map_err(|err| anyhow::anyhow!("invalid log filter '{}': {err}", settings.log_filter))?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = match settings.log_format {
        LogFormat::Json => builder.json().with_current_span(false).try_init().is_ok(),
        LogFormat::Pretty => builder.try_init().is_ok(),
    };

    if installed {
        tracing::debug!(
            target: "bookshelf-telemetry",
            format = ?settings.log_format,
            "tracing initialized"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_filter_is_reported() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let settings = TelemetrySettings {
            log_filter: "bookshelf=notalevel".to_string(),
            ..TelemetrySettings::default()
        };
        assert!(init(&settings).is_err());
    }

    #[test]
    fn repeated_init_is_tolerated() {
        let settings = TelemetrySettings::default();
        assert!(init(&settings).is_ok());
        assert!(init(&settings).is_ok());
    }
}
