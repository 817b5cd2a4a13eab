//! Negotiation strategies
//!
//! Each strategy looks at one request hint and either recognizes a media type
//! or passes. A strategy never fails: unknown extensions, unknown parameter
//! values and unusable Accept headers all simply yield `None`.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::accept::AcceptHeader;
use crate::error::ConfigError;
use crate::mappings::MediaTypeMappings;
use crate::media_type::MediaType;
use crate::request::NegotiationRequest;

/// Identifies a strategy in configuration and in negotiation outcomes.
///
/// Configuration names go through [`FromStr`], so `extension`, `accept` and
/// `query_parameter` are accepted as aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum StrategyKind {
	PathExtension,
	Parameter,
	Header,
}

impl StrategyKind {
	pub const DEFAULT_ORDER: [StrategyKind; 3] = [
		StrategyKind::PathExtension,
		StrategyKind::Parameter,
		StrategyKind::Header,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			StrategyKind::PathExtension => "path_extension",
			StrategyKind::Parameter => "parameter",
			StrategyKind::Header => "header",
		}
	}
}

impl fmt::Display for StrategyKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for StrategyKind {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
			"path_extension" | "extension" => Ok(StrategyKind::PathExtension),
			"parameter" | "query_parameter" => Ok(StrategyKind::Parameter),
			"header" | "accept" => Ok(StrategyKind::Header),
			_ => Err(ConfigError::UnknownStrategy(s.to_string())),
		}
	}
}

impl TryFrom<String> for StrategyKind {
	type Error = ConfigError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		value.parse()
	}
}

/// A single lookup method used by the negotiator.
pub trait NegotiationStrategy: fmt::Debug + Send + Sync {
	fn kind(&self) -> StrategyKind;

	/// Returns the media type this strategy recognizes for the request, if any.
	fn resolve(&self, request: &NegotiationRequest<'_>) -> Option<MediaType>;
}

/// Maps the last path segment's file extension through the extension table.
#[derive(Debug, Clone)]
pub struct PathExtensionStrategy {
	mappings: Arc<MediaTypeMappings>,
}

impl PathExtensionStrategy {
	pub fn new(mappings: Arc<MediaTypeMappings>) -> Self {
		Self { mappings }
	}

	/// Extracts the file extension of the last path segment
	///
	/// # Examples
	///
	/// ```
	/// use makas_negotiation::strategy::PathExtensionStrategy;
	///
	/// assert_eq!(PathExtensionStrategy::extension("/orders/42.json"), Some("json"));
	/// assert_eq!(PathExtensionStrategy::extension("/archive.v2/orders"), None);
	/// assert_eq!(PathExtensionStrategy::extension("/orders/"), None);
	/// assert_eq!(PathExtensionStrategy::extension("/orders/42."), None);
	/// ```
	pub fn extension(path: &str) -> Option<&str> {
		let segment = path.rsplit('/').next()?;
		// matrix parameters (`;jsessionid=...`) are not part of the file name
		let segment = segment.split(';').next().unwrap_or(segment);
		let (stem, extension) = segment.rsplit_once('.')?;
		if stem.is_empty() || extension.is_empty() {
			return None;
		}
		Some(extension)
	}
}

impl NegotiationStrategy for PathExtensionStrategy {
	fn kind(&self) -> StrategyKind {
		StrategyKind::PathExtension
	}

	fn resolve(&self, request: &NegotiationRequest<'_>) -> Option<MediaType> {
		let extension = Self::extension(request.path?)?;
		self.mappings.lookup(extension).cloned()
	}
}

/// Reads a named query parameter and maps its value through the extension
/// table (`?mediaType=json`).
#[derive(Debug, Clone)]
pub struct ParameterStrategy {
	parameter_name: String,
	mappings: Arc<MediaTypeMappings>,
}

impl ParameterStrategy {
	pub fn new(parameter_name: impl Into<String>, mappings: Arc<MediaTypeMappings>) -> Self {
		Self {
			parameter_name: parameter_name.into(),
			mappings,
		}
	}

	pub fn parameter_name(&self) -> &str {
		&self.parameter_name
	}
}

impl NegotiationStrategy for ParameterStrategy {
	fn kind(&self) -> StrategyKind {
		StrategyKind::Parameter
	}

	fn resolve(&self, request: &NegotiationRequest<'_>) -> Option<MediaType> {
		let query = request.query?;
		let pairs: Vec<(String, String)> = match serde_urlencoded::from_str(query) {
			Ok(pairs) => pairs,
			Err(error) => {
				tracing::trace!(query, %error, "undecodable query string");
				return None;
			}
		};
		let (_, value) = pairs
			.into_iter()
			.find(|(name, _)| *name == self.parameter_name)?;
		self.mappings.lookup(value.trim()).cloned()
	}
}

/// Picks the highest-weighted Accept entry present in the supported set.
#[derive(Debug, Clone)]
pub struct HeaderStrategy {
	supported: Arc<[MediaType]>,
}

impl HeaderStrategy {
	pub fn new(supported: impl Into<Arc<[MediaType]>>) -> Self {
		Self {
			supported: supported.into(),
		}
	}

	pub fn supported(&self) -> &[MediaType] {
		&self.supported
	}
}

impl NegotiationStrategy for HeaderStrategy {
	fn kind(&self) -> StrategyKind {
		StrategyKind::Header
	}

	fn resolve(&self, request: &NegotiationRequest<'_>) -> Option<MediaType> {
		let accept = AcceptHeader::parse(request.accept()?);
		if accept.is_any() {
			return None;
		}
		accept.find_best_match(&self.supported)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};

	#[fixture]
	fn mappings() -> Arc<MediaTypeMappings> {
		Arc::new(
			[
				("xml", MediaType::application_xml()),
				("json", MediaType::application_json()),
			]
			.into_iter()
			.collect(),
		)
	}

	#[rstest]
	#[case("/orders.xml", Some(MediaType::application_xml()))]
	#[case("/orders.JSON", Some(MediaType::application_json()))]
	#[case("/orders.json;jsessionid=abc", Some(MediaType::application_json()))]
	#[case("/a;v=1/orders.json", Some(MediaType::application_json()))]
	#[case("/a.json;v=1/orders", None)]
	#[case("/orders.html", None)]
	#[case("/orders", None)]
	#[case("/.json", None)]
	fn test_path_extension(
		mappings: Arc<MediaTypeMappings>,
		#[case] path: &str,
		#[case] expected: Option<MediaType>,
	) {
		let strategy = PathExtensionStrategy::new(mappings);
		let request = NegotiationRequest::new().with_path(path);
		assert_eq!(strategy.resolve(&request), expected);
	}

	#[rstest]
	#[case("mediaType=json", Some(MediaType::application_json()))]
	#[case("page=2&mediaType=xml", Some(MediaType::application_xml()))]
	#[case("mediaType=yaml", None)]
	#[case("format=json", None)]
	#[case("mediaType=%6Ason", Some(MediaType::application_json()))]
	fn test_parameter(
		mappings: Arc<MediaTypeMappings>,
		#[case] query: &str,
		#[case] expected: Option<MediaType>,
	) {
		let strategy = ParameterStrategy::new("mediaType", mappings);
		let request = NegotiationRequest::new().with_query(query);
		assert_eq!(strategy.resolve(&request), expected);
	}

	#[rstest]
	fn test_parameter_name_is_configurable(mappings: Arc<MediaTypeMappings>) {
		let strategy = ParameterStrategy::new("format", mappings);
		let request = NegotiationRequest::new().with_query("format=xml&mediaType=json");
		assert_eq!(strategy.resolve(&request), Some(MediaType::application_xml()));
		assert_eq!(strategy.parameter_name(), "format");
	}

	#[rstest]
	#[case("application/json;q=0.5,application/xml;q=0.9", Some(MediaType::application_xml()))]
	#[case("*/*", None)]
	#[case("", None)]
	#[case("image/png, text/html", None)]
	#[case("garbage, application/json", Some(MediaType::application_json()))]
	fn test_header(#[case] accept: &str, #[case] expected: Option<MediaType>) {
		let strategy = HeaderStrategy::new(vec![
			MediaType::application_xml(),
			MediaType::application_json(),
		]);
		let request = NegotiationRequest::new().with_accept(accept);
		assert_eq!(strategy.resolve(&request), expected);
	}

	#[rstest]
	#[case("path_extension", StrategyKind::PathExtension)]
	#[case("Path-Extension", StrategyKind::PathExtension)]
	#[case("parameter", StrategyKind::Parameter)]
	#[case("accept", StrategyKind::Header)]
	fn test_strategy_kind_from_str(#[case] input: &str, #[case] expected: StrategyKind) {
		assert_eq!(input.parse::<StrategyKind>().unwrap(), expected);
	}

	#[rstest]
	fn test_strategy_kind_deserializes_aliases() {
		let kinds: Vec<StrategyKind> =
			serde_json::from_str(r#"["extension", "query_parameter", "accept"]"#).unwrap();
		assert_eq!(kinds, StrategyKind::DEFAULT_ORDER.to_vec());

		let err = serde_json::from_str::<Vec<StrategyKind>>(r#"["cookie"]"#).unwrap_err();
		assert!(err.to_string().contains("unknown negotiation strategy 'cookie'"));
	}

	#[rstest]
	fn test_unknown_strategy_kind() {
		assert!(matches!(
			"jaf".parse::<StrategyKind>(),
			Err(ConfigError::UnknownStrategy(_))
		));
	}
}
