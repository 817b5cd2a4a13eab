//! The content negotiator

use std::fmt;
use std::sync::Arc;

use crate::config::NegotiationConfig;
use crate::error::ConfigError;
use crate::mappings::MediaTypeMappings;
use crate::media_type::MediaType;
use crate::request::NegotiationRequest;
use crate::strategy::{
	HeaderStrategy, NegotiationStrategy, ParameterStrategy, PathExtensionStrategy, StrategyKind,
};

/// What decided the negotiated media type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
	Strategy(StrategyKind),
	Default,
}

impl fmt::Display for Resolution {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Resolution::Strategy(kind) => fmt::Display::fmt(kind, f),
			Resolution::Default => f.write_str("default"),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NegotiationOutcome {
	pub media_type: MediaType,
	pub resolved_by: Resolution,
}

/// Selects exactly one response media type per request.
///
/// Built once at start-up and shared; negotiation itself only reads.
#[derive(Debug, Clone)]
pub struct ContentNegotiator {
	strategies: Vec<Arc<dyn NegotiationStrategy>>,
	default_media_type: MediaType,
	supported: Arc<[MediaType]>,
}

impl ContentNegotiator {
	/// Builds the negotiator described by `config`
	///
	/// # Examples
	///
	/// ```
	/// use makas_negotiation::{ContentNegotiator, MediaType, NegotiationConfig, NegotiationRequest};
	///
	/// let negotiator = ContentNegotiator::new(NegotiationConfig::default()).unwrap();
	///
	/// let request = NegotiationRequest::new()
	///     .with_path("/orders/7.json")
	///     .with_accept("application/xml");
	/// assert_eq!(negotiator.negotiate(&request), MediaType::application_json());
	///
	/// let request = NegotiationRequest::new().with_path("/orders/7");
	/// assert_eq!(negotiator.negotiate(&request), MediaType::application_xml());
	/// ```
	pub fn new(config: NegotiationConfig) -> Result<Self, ConfigError> {
		config.validate()?;
		Ok(Self::from_valid_config(config))
	}

	/// Assembles a negotiator from explicit strategies.
	///
	/// The supported set is whatever the header strategy (if any) was given.
	pub fn with_strategies(
		strategies: Vec<Arc<dyn NegotiationStrategy>>,
		default_media_type: MediaType,
		supported: Vec<MediaType>,
	) -> Self {
		Self {
			strategies,
			default_media_type,
			supported: supported.into(),
		}
	}

	fn from_valid_config(config: NegotiationConfig) -> Self {
		let supported: Arc<[MediaType]> = config.supported_set().into();
		let enabled = config.enabled_strategies();
		let mappings: Arc<MediaTypeMappings> = Arc::new(config.media_types);

		let strategies = enabled
			.into_iter()
			.map(|kind| -> Arc<dyn NegotiationStrategy> {
				match kind {
					StrategyKind::PathExtension => {
						Arc::new(PathExtensionStrategy::new(Arc::clone(&mappings)))
					}
					StrategyKind::Parameter => Arc::new(ParameterStrategy::new(
						config.parameter_name.clone(),
						Arc::clone(&mappings),
					)),
					StrategyKind::Header => Arc::new(HeaderStrategy::new(Arc::clone(&supported))),
				}
			})
			.collect();

		Self {
			strategies,
			default_media_type: config.default_content_type,
			supported,
		}
	}

	/// Returns the negotiated media type for the request.
	pub fn negotiate(&self, request: &NegotiationRequest<'_>) -> MediaType {
		self.negotiate_outcome(request).media_type
	}

	/// Like [`negotiate`](Self::negotiate), also reporting which strategy won.
	pub fn negotiate_outcome(&self, request: &NegotiationRequest<'_>) -> NegotiationOutcome {
		for strategy in &self.strategies {
			if let Some(media_type) = strategy.resolve(request) {
				tracing::debug!(
					strategy = %strategy.kind(),
					media_type = %media_type,
					path = request.path.unwrap_or_default(),
					"content negotiated"
				);
				return NegotiationOutcome {
					media_type,
					resolved_by: Resolution::Strategy(strategy.kind()),
				};
			}
		}

		tracing::debug!(
			media_type = %self.default_media_type,
			path = request.path.unwrap_or_default(),
			"no strategy matched, using default media type"
		);
		NegotiationOutcome {
			media_type: self.default_media_type.clone(),
			resolved_by: Resolution::Default,
		}
	}

	pub fn default_media_type(&self) -> &MediaType {
		&self.default_media_type
	}

	pub fn supported_media_types(&self) -> &[MediaType] {
		&self.supported
	}

	/// Enabled strategies, in the order they are consulted.
	pub fn strategies(&self) -> Vec<StrategyKind> {
		self.strategies.iter().map(|s| s.kind()).collect()
	}
}

impl Default for ContentNegotiator {
	fn default() -> Self {
		Self::from_valid_config(NegotiationConfig::default())
	}
}
