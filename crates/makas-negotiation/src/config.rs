//! Negotiator configuration

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::mappings::MediaTypeMappings;
use crate::media_type::MediaType;
use crate::strategy::StrategyKind;

pub const DEFAULT_PARAMETER_NAME: &str = "mediaType";

/// Every option the content negotiator understands.
///
/// The defaults favor the path extension, leave the query parameter off,
/// honor the Accept header and fall back to `application/xml`, with `xml`
/// and `json` as the known extensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NegotiationConfig {
	pub favor_path_extension: bool,
	pub favor_parameter: bool,
	pub parameter_name: String,
	pub ignore_accept_header: bool,
	pub default_content_type: MediaType,
	pub media_types: MediaTypeMappings,
	/// Extra types the Accept header may select besides the extension table's.
	pub supported_media_types: Vec<MediaType>,
	pub strategy_order: Vec<StrategyKind>,
}

impl Default for NegotiationConfig {
	fn default() -> Self {
		Self {
			favor_path_extension: true,
			favor_parameter: false,
			parameter_name: DEFAULT_PARAMETER_NAME.to_string(),
			ignore_accept_header: false,
			default_content_type: MediaType::application_xml(),
			media_types: [
				("xml", MediaType::application_xml()),
				("json", MediaType::application_json()),
			]
			.into_iter()
			.collect(),
			supported_media_types: Vec::new(),
			strategy_order: StrategyKind::DEFAULT_ORDER.to_vec(),
		}
	}
}

impl NegotiationConfig {
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a builder for fluent configuration
	///
	/// # Examples
	///
	/// ```
	/// use makas_negotiation::{MediaType, NegotiationConfig};
	///
	/// let config = NegotiationConfig::builder()
	///     .favor_parameter(true)
	///     .parameter_name("format")
	///     .default_content_type(MediaType::application_json())
	///     .media_type("txt", MediaType::text_plain())
	///     .build()
	///     .unwrap();
	///
	/// assert!(config.favor_parameter);
	/// assert_eq!(config.parameter_name, "format");
	/// assert_eq!(config.media_types.lookup("txt"), Some(&MediaType::text_plain()));
	/// assert_eq!(config.media_types.len(), 3);
	/// ```
	pub fn builder() -> NegotiationConfigBuilder {
		NegotiationConfigBuilder::default()
	}

	/// Checks the invariants the negotiator relies on.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.parameter_name.trim().is_empty() {
			return Err(ConfigError::EmptyParameterName);
		}
		if !self.default_content_type.is_concrete() {
			return Err(ConfigError::WildcardDefault(
				self.default_content_type.clone(),
			));
		}
		self.media_types.validate()?;
		for (i, kind) in self.strategy_order.iter().enumerate() {
			if self.strategy_order[..i].contains(kind) {
				return Err(ConfigError::DuplicateStrategy(*kind));
			}
		}
		Ok(())
	}

	pub fn is_enabled(&self, kind: StrategyKind) -> bool {
		match kind {
			StrategyKind::PathExtension => self.favor_path_extension,
			StrategyKind::Parameter => self.favor_parameter,
			StrategyKind::Header => !self.ignore_accept_header,
		}
	}

	/// Enabled strategies in priority order. A strategy missing from
	/// `strategy_order` is never consulted.
	pub fn enabled_strategies(&self) -> Vec<StrategyKind> {
		self.strategy_order
			.iter()
			.copied()
			.filter(|kind| self.is_enabled(*kind))
			.collect()
	}

	/// The extension table's types followed by `supported_media_types`,
	/// without duplicates.
	pub fn supported_set(&self) -> Vec<MediaType> {
		let mut supported = self.media_types.media_types();
		for media_type in &self.supported_media_types {
			if !supported.contains(media_type) {
				supported.push(media_type.clone());
			}
		}
		supported
	}
}

/// Builder for [`NegotiationConfig`]
#[derive(Debug, Default)]
pub struct NegotiationConfigBuilder {
	favor_path_extension: Option<bool>,
	favor_parameter: Option<bool>,
	parameter_name: Option<String>,
	ignore_accept_header: Option<bool>,
	default_content_type: Option<MediaType>,
	media_types: Vec<(String, MediaType)>,
	replace_media_types: bool,
	supported_media_types: Vec<MediaType>,
	strategy_order: Option<Vec<StrategyKind>>,
}

impl NegotiationConfigBuilder {
	pub fn favor_path_extension(mut self, favor: bool) -> Self {
		self.favor_path_extension = Some(favor);
		self
	}

	pub fn favor_parameter(mut self, favor: bool) -> Self {
		self.favor_parameter = Some(favor);
		self
	}

	pub fn parameter_name(mut self, name: impl Into<String>) -> Self {
		self.parameter_name = Some(name.into());
		self
	}

	pub fn ignore_accept_header(mut self, ignore: bool) -> Self {
		self.ignore_accept_header = Some(ignore);
		self
	}

	pub fn default_content_type(mut self, media_type: MediaType) -> Self {
		self.default_content_type = Some(media_type);
		self
	}

	/// Adds an extension mapping on top of the defaults.
	pub fn media_type(mut self, extension: impl Into<String>, media_type: MediaType) -> Self {
		self.media_types.push((extension.into(), media_type));
		self
	}

	/// Drops the default `xml`/`json` mappings before applying
	/// [`media_type`](Self::media_type) entries.
	pub fn replace_media_types(mut self) -> Self {
		self.replace_media_types = true;
		self
	}

	pub fn supported_media_type(mut self, media_type: MediaType) -> Self {
		self.supported_media_types.push(media_type);
		self
	}

	pub fn strategy_order(mut self, order: Vec<StrategyKind>) -> Self {
		self.strategy_order = Some(order);
		self
	}

	pub fn build(self) -> Result<NegotiationConfig, ConfigError> {
		let default = NegotiationConfig::default();
		let mut media_types = if self.replace_media_types {
			MediaTypeMappings::new()
		} else {
			default.media_types
		};
		for (ext, media_type) in self.media_types {
			media_types.insert(ext, media_type);
		}

		let config = NegotiationConfig {
			favor_path_extension: self
				.favor_path_extension
				.unwrap_or(default.favor_path_extension),
			favor_parameter: self.favor_parameter.unwrap_or(default.favor_parameter),
			parameter_name: self.parameter_name.unwrap_or(default.parameter_name),
			ignore_accept_header: self
				.ignore_accept_header
				.unwrap_or(default.ignore_accept_header),
			default_content_type: self
				.default_content_type
				.unwrap_or(default.default_content_type),
			media_types,
			supported_media_types: self.supported_media_types,
			strategy_order: self.strategy_order.unwrap_or(default.strategy_order),
		};
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_defaults() {
		let config = NegotiationConfig::default();
		assert!(config.favor_path_extension);
		assert!(!config.favor_parameter);
		assert!(!config.ignore_accept_header);
		assert_eq!(config.parameter_name, "mediaType");
		assert_eq!(config.default_content_type, MediaType::application_xml());
		assert_eq!(
			config.enabled_strategies(),
			vec![StrategyKind::PathExtension, StrategyKind::Header]
		);
		assert!(config.validate().is_ok());
	}

	#[rstest]
	fn test_supported_set_appends_extras_once() {
		let config = NegotiationConfig::builder()
			.supported_media_type(MediaType::text_xml())
			.supported_media_type(MediaType::application_json())
			.build()
			.unwrap();
		assert_eq!(
			config.supported_set(),
			vec![
				MediaType::application_xml(),
				MediaType::application_json(),
				MediaType::text_xml(),
			]
		);
	}

	#[rstest]
	fn test_replace_media_types() {
		let config = NegotiationConfig::builder()
			.replace_media_types()
			.media_type("csv", MediaType::new("text", "csv"))
			.build()
			.unwrap();
		assert_eq!(config.media_types.len(), 1);
		assert!(config.media_types.lookup("xml").is_none());
	}

	#[rstest]
	fn test_invalid_configurations() {
		assert!(matches!(
			NegotiationConfig::builder().parameter_name(" ").build(),
			Err(ConfigError::EmptyParameterName)
		));
		assert!(matches!(
			NegotiationConfig::builder()
				.default_content_type(MediaType::new("text", "*"))
				.build(),
			Err(ConfigError::WildcardDefault(_))
		));
		assert!(matches!(
			NegotiationConfig::builder()
				.strategy_order(vec![StrategyKind::Header, StrategyKind::Header])
				.build(),
			Err(ConfigError::DuplicateStrategy(StrategyKind::Header))
		));
	}

	#[rstest]
	fn test_deserialize_partial_toml() {
		let config: NegotiationConfig = toml::from_str(
			r#"
			favor_parameter = true
			default_content_type = "application/json"
			strategy_order = ["header", "parameter"]

			[media_types]
			xml = "application/xml"
			"#,
		)
		.unwrap();

		assert!(config.favor_path_extension);
		assert!(config.favor_parameter);
		assert_eq!(config.default_content_type, MediaType::application_json());
		assert_eq!(config.media_types.len(), 1);
		assert_eq!(
			config.enabled_strategies(),
			vec![StrategyKind::Header, StrategyKind::Parameter]
		);
	}
}
