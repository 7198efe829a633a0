//! Structured logging setup.
//!
//! Library code only emits `tracing` events; binaries and tests that want to
//! see them call [`init_logging`] once.

use tracing::info;
use tracing_subscriber::fmt::format::FmtSpan;

use crate::config::LoggingConfig;
use crate::error::{ExchangeError, Result};

/// Install a global fmt subscriber configured from `config`.
///
/// Fails if a global subscriber is already set.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let span_events = if config.log_spans {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let builder = tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_span_events(span_events)
        .with_target(true);

    let installed = if config.json_format {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| ExchangeError::ConfigError(format!("Failed to install logger: {e}")))?;

    info!(app = %config.app_name, level = %config.log_level, "Logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails() {
        let config = LoggingConfig::default();
        // another test may have installed a subscriber first
        let _ = init_logging(&config);
        assert!(matches!(
            init_logging(&config),
            Err(ExchangeError::ConfigError(_))
        ));
    }
}
