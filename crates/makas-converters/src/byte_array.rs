//! Raw byte bodies, passed through unchanged

use async_trait::async_trait;
use bytes::Bytes;
use makas_negotiation::MediaType;

use crate::converter::{MessageConverter, unsupported};
use crate::error::ConverterResult;
use crate::payload::{Payload, PayloadType};

/// Passes raw bytes through in any media type.
#[derive(Debug, Clone, Default)]
pub struct ByteArrayConverter;

impl ByteArrayConverter {
	pub fn new() -> Self {
		Self
	}
}

#[async_trait]
impl MessageConverter for ByteArrayConverter {
	fn name(&self) -> &'static str {
		"byte array"
	}

	fn payload_type(&self) -> PayloadType {
		PayloadType::Bytes
	}

	fn supported_media_types(&self) -> Vec<MediaType> {
		vec![MediaType::application_octet_stream(), MediaType::all()]
	}

	async fn write(&self, payload: &Payload, _media_type: &MediaType) -> ConverterResult<Bytes> {
		match payload {
			Payload::Bytes(bytes) => Ok(bytes.clone()),
			other => Err(unsupported(self.name(), other)),
		}
	}

	async fn read(&self, body: Bytes, _media_type: &MediaType) -> ConverterResult<Payload> {
		Ok(Payload::Bytes(body))
	}
}
