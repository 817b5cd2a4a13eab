//! Tracing/logging initialization.

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Output format of the fmt subscriber
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
	#[default]
	Plain,
	Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
	/// Filter directive used when `RUST_LOG` is unset, e.g. `info` or
	/// `makas_negotiation=debug,info`
	pub level: String,
	pub format: LogFormat,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
			format: LogFormat::Plain,
		}
	}
}

impl LoggingConfig {
	/// `RUST_LOG` wins over the configured level; an unparsable level
	/// falls back to `info`.
	pub fn env_filter(&self) -> EnvFilter {
		EnvFilter::try_from_default_env()
			.or_else(|_| EnvFilter::try_new(&self.level))
			.unwrap_or_else(|_| EnvFilter::new("info"))
	}
}

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops). Returns
/// whether this call installed the global subscriber.
pub fn init(config: &LoggingConfig) -> bool {
	let builder = tracing_subscriber::fmt()
		.with_env_filter(config.env_filter())
		.with_target(true);

	let installed = match config.format {
		LogFormat::Plain => builder.try_init().is_ok(),
		LogFormat::Json => builder
			.json()
			.with_timer(tracing_subscriber::fmt::time::SystemTime)
			.try_init()
			.is_ok(),
	};

	if installed {
		tracing::debug!(level = %config.level, format = ?config.format, "logging initialized");
	}
	installed
}
