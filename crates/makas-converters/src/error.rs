//! Converter error types

use http::StatusCode;
use makas_negotiation::MediaType;
use thiserror::Error;

use crate::payload::PayloadType;

pub type ConverterResult<T> = Result<T, ConverterError>;

/// Errors raised while selecting a converter or converting a body.
///
/// Selection failures are the client's doing (it asked for, or sent, a
/// representation nobody can handle); serialization failures are ours.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConverterError {
	/// Nothing can write this payload as the negotiated media type.
	#[error("no converter can write a {payload_type} payload as {media_type}")]
	NoConverterFound {
		media_type: MediaType,
		payload_type: PayloadType,
	},

	/// Nothing can read a body of this media type into the payload type.
	#[error("no converter can read {media_type} into a {payload_type} payload")]
	NoReaderFound {
		media_type: MediaType,
		payload_type: PayloadType,
	},

	#[error("{converter} cannot handle a {actual} payload")]
	UnsupportedPayload {
		converter: &'static str,
		actual: PayloadType,
	},

	/// The request body could not be decoded.
	#[error("malformed {media_type} body: {message}")]
	Malformed { media_type: MediaType, message: String },

	/// The response payload could not be encoded.
	#[error("serialization failed: {0}")]
	Serialization(String),
}

impl ConverterError {
	pub fn malformed(media_type: &MediaType, message: impl Into<String>) -> Self {
		Self::Malformed {
			media_type: media_type.without_parameters(),
			message: message.into(),
		}
	}

	/// HTTP status this error should surface as.
	///
	/// # Examples
	///
	/// ```
	/// use http::StatusCode;
	/// use makas_converters::{ConverterError, PayloadType};
	/// use makas_negotiation::MediaType;
	///
	/// let err = ConverterError::NoConverterFound {
	///     media_type: MediaType::text_plain(),
	///     payload_type: PayloadType::Object,
	/// };
	/// assert_eq!(err.status_code(), StatusCode::NOT_ACCEPTABLE);
	/// assert!(err.is_client_error());
	/// ```
	pub fn status_code(&self) -> StatusCode {
		match self {
			ConverterError::NoConverterFound { .. } => StatusCode::NOT_ACCEPTABLE,
			ConverterError::NoReaderFound { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
			ConverterError::Malformed { .. } => StatusCode::BAD_REQUEST,
			ConverterError::UnsupportedPayload { .. } | ConverterError::Serialization(_) => {
				StatusCode::INTERNAL_SERVER_ERROR
			}
		}
	}

	pub fn is_client_error(&self) -> bool {
		self.status_code().is_client_error()
	}
}
