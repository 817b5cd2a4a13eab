//! Application configuration
//!
//! One [`WebConfig`] holds every tunable of the stack, grouped in sections
//! that mirror the crates they configure:
//!
//! ```toml
//! [negotiation]
//! favor_parameter = true
//! default_content_type = "application/json"
//!
//! [negotiation.media_types]
//! xml = "application/xml"
//! json = "application/json"
//!
//! [json]
//! pretty_print = true
//!
//! [xml]
//! root_element = "orders"
//!
//! [logging]
//! level = "debug"
//! format = "json"
//! ```
//!
//! Missing sections and fields fall back to their defaults.

use std::path::Path;

use anyhow::Context;
use makas_converters::{ConverterRegistry, JsonConfig, XmlConfig};
use makas_negotiation::{ContentNegotiator, NegotiationConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logging::LoggingConfig;
use crate::service::RepresentationService;

/// Errors raised while loading or validating a [`WebConfig`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WebConfigError {
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	#[error("JSON parse error: {0}")]
	Json(#[from] serde_json::Error),

	#[error("unsupported configuration format '{0}', expected .toml or .json")]
	UnsupportedFormat(String),

	#[error("invalid negotiation settings: {0}")]
	Negotiation(#[from] makas_negotiation::ConfigError),

	#[error("invalid XML settings: {0}")]
	Xml(makas_converters::ConverterError),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
	pub negotiation: NegotiationConfig,
	pub json: JsonConfig,
	pub xml: XmlConfig,
	pub logging: LoggingConfig,
}

impl WebConfig {
	/// Parses and validates a TOML document
	///
	/// # Examples
	///
	/// ```
	/// use makas::WebConfig;
	/// use makas_negotiation::MediaType;
	///
	/// let config = WebConfig::from_toml_str(
	///     r#"
	///     [negotiation]
	///     default_content_type = "application/json"
	///     "#,
	/// )
	/// .unwrap();
	/// assert_eq!(config.negotiation.default_content_type, MediaType::application_json());
	/// assert!(config.negotiation.favor_path_extension);
	/// ```
	pub fn from_toml_str(contents: &str) -> Result<Self, WebConfigError> {
		let config: WebConfig = toml::from_str(contents)?;
		config.validate()?;
		Ok(config)
	}

	pub fn from_json_str(contents: &str) -> Result<Self, WebConfigError> {
		let config: WebConfig = serde_json::from_str(contents)?;
		config.validate()?;
		Ok(config)
	}

	/// Loads a `.toml` or `.json` configuration file.
	pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
		let path = path.as_ref();
		let contents = std::fs::read_to_string(path)
			.with_context(|| format!("failed to read {}", path.display()))?;

		let config = match path.extension().and_then(|s| s.to_str()) {
			Some("toml") => Self::from_toml_str(&contents),
			Some("json") => Self::from_json_str(&contents),
			other => Err(WebConfigError::UnsupportedFormat(
				other.unwrap_or_default().to_string(),
			)),
		}
		.with_context(|| format!("invalid configuration in {}", path.display()))?;

		tracing::debug!(path = %path.display(), "loaded configuration");
		Ok(config)
	}

	pub fn validate(&self) -> Result<(), WebConfigError> {
		self.negotiation.validate()?;
		self.xml.validate().map_err(WebConfigError::Xml)
	}

	/// The negotiator, whose Accept matching also covers every concrete
	/// media type the converter registry can produce.
	pub fn negotiator(&self) -> Result<ContentNegotiator, WebConfigError> {
		self.negotiator_for(&self.converters())
	}

	fn negotiator_for(
		&self,
		converters: &ConverterRegistry,
	) -> Result<ContentNegotiator, WebConfigError> {
		let mut negotiation = self.negotiation.clone();
		for media_type in converters.supported_media_types() {
			if media_type.is_concrete() && !negotiation.supported_media_types.contains(&media_type) {
				negotiation.supported_media_types.push(media_type);
			}
		}
		Ok(ContentNegotiator::new(negotiation)?)
	}

	pub fn converters(&self) -> ConverterRegistry {
		ConverterRegistry::with_defaults(self.json.clone(), self.xml.clone())
	}

	/// Builds the negotiator and converter registry once, for sharing
	/// across requests.
	pub fn build_service(&self) -> Result<RepresentationService, WebConfigError> {
		self.validate()?;
		let converters = self.converters();
		let negotiator = self.negotiator_for(&converters)?;
		Ok(RepresentationService::new(negotiator, converters))
	}
}
