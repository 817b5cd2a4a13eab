//! Error types for media type parsing and negotiation configuration.

use thiserror::Error;

use crate::media_type::MediaType;
use crate::strategy::StrategyKind;

/// Errors raised while parsing a media type or media range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaTypeError {
	#[error("media type is empty")]
	Empty,

	#[error("media type '{0}' has no subtype")]
	MissingSubtype(String),

	#[error("media type '{0}' contains an invalid token")]
	InvalidToken(String),

	/// `*/json` and friends are not valid ranges.
	#[error("media type '{0}' uses a wildcard type with a concrete subtype")]
	WildcardType(String),

	#[error("invalid media type parameter '{0}'")]
	InvalidParameter(String),

	#[error("invalid quality value '{0}'")]
	InvalidQuality(String),
}

/// Errors raised while validating a [`NegotiationConfig`](crate::NegotiationConfig).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
	#[error("query parameter name must not be empty")]
	EmptyParameterName,

	#[error("invalid file extension '{0}'")]
	InvalidExtension(String),

	#[error("strategy '{0}' is listed more than once")]
	DuplicateStrategy(StrategyKind),

	#[error("unknown negotiation strategy '{0}'")]
	UnknownStrategy(String),

	/// The fallback must be something a converter can actually produce.
	#[error("default media type '{0}' must not be a wildcard")]
	WildcardDefault(MediaType),
}
