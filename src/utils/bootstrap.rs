//! Bootstrap utilities for the server binary.

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LOG_ENV_VAR;

/// Initialize tracing with the STARTUP_PROFIT_LOG environment variable.
///
/// Defaults to "info" level if STARTUP_PROFIT_LOG is not set.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env(LOG_ENV_VAR)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Read `--config <path>` (or `--config=<path>`) from the command line.
pub fn parse_config_path() -> Option<String> {
    parse_config_arg(std::env::args().skip(1))
}

fn parse_config_arg(mut args: impl Iterator<Item = String>) -> Option<String> {
    while let Some(arg) = args.next() {
        if arg == "--config" || arg == "-c" {
            return args.next();
        }
        if let Some(path) = arg.strip_prefix("--config=") {
            return Some(path.to_string());
        }
    }
    None
}

/// Resolves once the process receives Ctrl-C.
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(e) => warn!(error = %e, "failed to listen for shutdown signal"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn test_config_flag_with_separate_value() {
        assert_eq!(
            parse_config_arg(args(&["--config", "prod.yaml"])),
            Some("prod.yaml".to_string())
        );
    }

    #[test]
    fn test_config_flag_with_equals() {
        assert_eq!(
            parse_config_arg(args(&["--verbose", "--config=prod.yaml"])),
            Some("prod.yaml".to_string())
        );
    }

    #[test]
    fn test_no_config_flag() {
        assert_eq!(parse_config_arg(args(&["--verbose"])), None);
        assert_eq!(parse_config_arg(args(&["--config"])), None);
    }
}
