//! JSON marshalling through `serde_json`

use async_trait::async_trait;
use bytes::Bytes;
use makas_negotiation::MediaType;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::converter::{MessageConverter, unsupported};
use crate::error::{ConverterError, ConverterResult};
use crate::payload::{Payload, PayloadType};

/// JSON marshaller configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonConfig {
	/// Indent output
	pub pretty_print: bool,
	/// Read an empty body as `null` instead of rejecting it
	pub allow_empty: bool,
}

/// Object payloads as `application/json` and `text/json`.
///
/// Dates and times are written the way their `Serialize` impl writes them,
/// which for chrono types is an ISO-8601 string.
#[derive(Debug, Clone, Default)]
pub struct JsonConverter {
	config: JsonConfig,
}

impl JsonConverter {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_config(config: JsonConfig) -> Self {
		Self { config }
	}

	pub fn config(&self) -> &JsonConfig {
		&self.config
	}
}

#[async_trait]
impl MessageConverter for JsonConverter {
	fn name(&self) -> &'static str {
		"json"
	}

	fn payload_type(&self) -> PayloadType {
		PayloadType::Object
	}

	fn supported_media_types(&self) -> Vec<MediaType> {
		vec![MediaType::application_json(), MediaType::text_json()]
	}

	async fn write(&self, payload: &Payload, _media_type: &MediaType) -> ConverterResult<Bytes> {
		let Payload::Object(value) = payload else {
			return Err(unsupported(self.name(), payload));
		};
		let encoded = if self.config.pretty_print {
			serde_json::to_vec_pretty(value)
		} else {
			serde_json::to_vec(value)
		};
		encoded
			.map(Bytes::from)
			.map_err(|e| ConverterError::Serialization(e.to_string()))
	}

	async fn read(&self, body: Bytes, media_type: &MediaType) -> ConverterResult<Payload> {
		if body.iter().all(u8::is_ascii_whitespace) {
			if self.config.allow_empty {
				return Ok(Payload::Object(Value::Null));
			}
			return Err(ConverterError::malformed(media_type, "empty body"));
		}
		serde_json::from_slice::<Value>(&body)
			.map(Payload::Object)
			.map_err(|e| ConverterError::malformed(media_type, format!("invalid JSON: {}", e)))
	}
}
