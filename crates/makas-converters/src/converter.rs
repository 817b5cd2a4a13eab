//! The message converter trait

use async_trait::async_trait;
use bytes::Bytes;
use makas_negotiation::MediaType;

use crate::error::{ConverterError, ConverterResult};
use crate::payload::{Payload, PayloadType};

/// Reads and writes one payload type in a set of media types.
///
/// Implementations hold only immutable configuration and are shared
/// across requests.
#[async_trait]
pub trait MessageConverter: Send + Sync {
	/// Short name used in logs and errors.
	fn name(&self) -> &'static str;

	fn payload_type(&self) -> PayloadType;

	fn supported_media_types(&self) -> Vec<MediaType>;

	/// Whether any supported media type is compatible with `media_type`.
	fn supports(&self, media_type: &MediaType) -> bool {
		self.supported_media_types()
			.iter()
			.any(|supported| supported.is_compatible_with(media_type))
	}

	/// `None` means "any media type".
	fn can_write(&self, payload_type: PayloadType, media_type: Option<&MediaType>) -> bool {
		payload_type == self.payload_type() && media_type.is_none_or(|mt| self.supports(mt))
	}

	fn can_read(&self, payload_type: PayloadType, media_type: Option<&MediaType>) -> bool {
		self.can_write(payload_type, media_type)
	}

	/// The `Content-Type` to send for a body written as `media_type`.
	///
	/// Wildcards are replaced by the first concrete supported type.
	fn content_type(&self, media_type: &MediaType) -> MediaType {
		if media_type.is_concrete() {
			return media_type.clone();
		}
		self.supported_media_types()
			.into_iter()
			.find(|supported| supported.is_concrete() && media_type.includes(supported))
			.unwrap_or_else(MediaType::application_octet_stream)
	}

	async fn write(&self, payload: &Payload, media_type: &MediaType) -> ConverterResult<Bytes>;

	async fn read(&self, body: Bytes, media_type: &MediaType) -> ConverterResult<Payload>;
}

pub(crate) fn unsupported(converter: &'static str, payload: &Payload) -> ConverterError {
	ConverterError::UnsupportedPayload {
		converter,
		actual: payload.payload_type(),
	}
}
