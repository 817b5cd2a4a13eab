//! Plain text bodies with charset handling

use async_trait::async_trait;
use bytes::Bytes;
use makas_negotiation::MediaType;

use crate::converter::{MessageConverter, unsupported};
use crate::error::{ConverterError, ConverterResult};
use crate::payload::{Payload, PayloadType};

pub const DEFAULT_CHARSET: &str = "UTF-8";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Charset {
	Utf8,
	Latin1,
	Ascii,
}

impl Charset {
	fn from_label(label: &str) -> Option<Self> {
		match label.to_ascii_lowercase().as_str() {
			"utf-8" | "utf8" => Some(Charset::Utf8),
			"iso-8859-1" | "latin1" | "l1" => Some(Charset::Latin1),
			"us-ascii" | "ascii" => Some(Charset::Ascii),
			_ => None,
		}
	}

	fn limit(&self) -> u32 {
		match self {
			Charset::Utf8 => u32::from(char::MAX),
			Charset::Latin1 => 0xFF,
			Charset::Ascii => 0x7F,
		}
	}
}

/// Writes and reads plain strings, honoring the `charset` parameter.
///
/// Understands UTF-8 (the default), ISO-8859-1 and US-ASCII.
#[derive(Debug, Clone)]
pub struct StringConverter {
	default_charset: String,
}

impl Default for StringConverter {
	fn default() -> Self {
		Self {
			default_charset: DEFAULT_CHARSET.to_string(),
		}
	}
}

impl StringConverter {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn default_charset(mut self, charset: impl Into<String>) -> Self {
		self.default_charset = charset.into();
		self
	}

	fn charset_for<'a>(&'a self, media_type: &'a MediaType) -> &'a str {
		media_type
			.parameter("charset")
			.unwrap_or(&self.default_charset)
	}

	fn encode(&self, text: &str, media_type: &MediaType) -> ConverterResult<Bytes> {
		let label = self.charset_for(media_type);
		let charset = Charset::from_label(label)
			.ok_or_else(|| ConverterError::Serialization(format!("unsupported charset {}", label)))?;
		if charset == Charset::Utf8 {
			return Ok(Bytes::copy_from_slice(text.as_bytes()));
		}
		text.chars()
			.map(|c| {
				let code = u32::from(c);
				u8::try_from(code)
					.ok()
					.filter(|_| code <= charset.limit())
					.ok_or_else(|| {
						ConverterError::Serialization(format!("'{}' cannot be encoded as {}", c, label))
					})
			})
			.collect::<ConverterResult<Vec<u8>>>()
			.map(Bytes::from)
	}

	fn decode(&self, body: &[u8], media_type: &MediaType) -> ConverterResult<String> {
		let label = self.charset_for(media_type);
		let charset = Charset::from_label(label)
			.ok_or_else(|| ConverterError::malformed(media_type, format!("unsupported charset {}", label)))?;
		match charset {
			Charset::Utf8 => String::from_utf8(body.to_vec())
				.map_err(|e| ConverterError::malformed(media_type, e.to_string())),
			Charset::Latin1 => Ok(body.iter().map(|&b| char::from(b)).collect()),
			Charset::Ascii => {
				if body.is_ascii() {
					Ok(body.iter().map(|&b| char::from(b)).collect())
				} else {
					Err(ConverterError::malformed(media_type, "non-ASCII byte in body"))
				}
			}
		}
	}
}

#[async_trait]
impl MessageConverter for StringConverter {
	fn name(&self) -> &'static str {
		"string"
	}

	fn payload_type(&self) -> PayloadType {
		PayloadType::Text
	}

	fn supported_media_types(&self) -> Vec<MediaType> {
		vec![MediaType::text_plain(), MediaType::all()]
	}

	fn content_type(&self, media_type: &MediaType) -> MediaType {
		let base = if media_type.is_concrete() {
			media_type.clone()
		} else {
			MediaType::text_plain()
		};
		if base.parameter("charset").is_some() {
			base
		} else {
			base.with_parameter("charset", self.default_charset.clone())
		}
	}

	async fn write(&self, payload: &Payload, media_type: &MediaType) -> ConverterResult<Bytes> {
		match payload {
			Payload::Text(text) => self.encode(text, media_type),
			other => Err(unsupported(self.name(), other)),
		}
	}

	async fn read(&self, body: Bytes, media_type: &MediaType) -> ConverterResult<Payload> {
		self.decode(&body, media_type).map(Payload::Text)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[tokio::test]
	async fn test_write_utf8_by_default() {
		let converter = StringConverter::new();
		let body = converter
			.write(&Payload::from("café"), &MediaType::text_plain())
			.await
			.unwrap();
		assert_eq!(body.as_ref(), "café".as_bytes());
	}

	#[rstest]
	#[tokio::test]
	async fn test_write_latin1() {
		let converter = StringConverter::new();
		let media_type = MediaType::text_plain().with_parameter("charset", "ISO-8859-1");
		let body = converter.write(&Payload::from("café"), &media_type).await.unwrap();
		assert_eq!(body.as_ref(), &[b'c', b'a', b'f', 0xE9]);

		let back = converter.read(body, &media_type).await.unwrap();
		assert_eq!(back, Payload::from("café"));
	}

	#[rstest]
	#[tokio::test]
	async fn test_unencodable_character() {
		let converter = StringConverter::new();
		let media_type = MediaType::text_plain().with_parameter("charset", "us-ascii");
		let err = converter
			.write(&Payload::from("naïve"), &media_type)
			.await
			.unwrap_err();
		assert_eq!(err.status_code(), http::StatusCode::INTERNAL_SERVER_ERROR);
	}

	#[rstest]
	#[tokio::test]
	async fn test_invalid_utf8_is_a_client_error() {
		let converter = StringConverter::new();
		let err = converter
			.read(Bytes::from_static(&[0xFF, 0xFE]), &MediaType::text_plain())
			.await
			.unwrap_err();
		assert!(err.is_client_error());
	}

	#[rstest]
	#[case(MediaType::text_plain(), "text/plain;charset=UTF-8")]
	#[case(MediaType::all(), "text/plain;charset=UTF-8")]
	#[case(MediaType::new("text", "csv"), "text/csv;charset=UTF-8")]
	#[case(
		MediaType::text_plain().with_parameter("charset", "ISO-8859-1"),
		"text/plain;charset=ISO-8859-1"
	)]
	fn test_content_type(#[case] media_type: MediaType, #[case] expected: &str) {
		assert_eq!(StringConverter::new().content_type(&media_type).to_string(), expected);
	}
}
