//! URL-encoded form bodies

use async_trait::async_trait;
use bytes::Bytes;
use makas_negotiation::MediaType;

use crate::converter::{MessageConverter, unsupported};
use crate::error::{ConverterError, ConverterResult};
use crate::payload::{Payload, PayloadType};

/// `application/x-www-form-urlencoded` bodies as ordered key/value pairs.
///
/// Repeated keys are kept, in body order.
#[derive(Debug, Clone, Default)]
pub struct FormConverter;

impl FormConverter {
	pub fn new() -> Self {
		Self
	}
}

#[async_trait]
impl MessageConverter for FormConverter {
	fn name(&self) -> &'static str {
		"form"
	}

	fn payload_type(&self) -> PayloadType {
		PayloadType::Form
	}

	fn supported_media_types(&self) -> Vec<MediaType> {
		vec![MediaType::application_form_urlencoded()]
	}

	async fn write(&self, payload: &Payload, _media_type: &MediaType) -> ConverterResult<Bytes> {
		match payload {
			Payload::Form(fields) => serde_urlencoded::to_string(fields)
				.map(Bytes::from)
				.map_err(|e| ConverterError::Serialization(e.to_string())),
			other => Err(unsupported(self.name(), other)),
		}
	}

	async fn read(&self, body: Bytes, media_type: &MediaType) -> ConverterResult<Payload> {
		serde_urlencoded::from_bytes::<Vec<(String, String)>>(&body)
			.map(Payload::Form)
			.map_err(|e| ConverterError::malformed(media_type, e.to_string()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[tokio::test]
	async fn test_write_encodes_fields() {
		let converter = FormConverter::new();
		let payload = Payload::Form(vec![
			("name".into(), "Ada Lovelace".into()),
			("lang".into(), "en&fr".into()),
		]);
		let body = converter
			.write(&payload, &MediaType::application_form_urlencoded())
			.await
			.unwrap();
		assert_eq!(body.as_ref(), b"name=Ada+Lovelace&lang=en%26fr");
	}

	#[rstest]
	#[tokio::test]
	async fn test_read_keeps_repeated_keys() {
		let converter = FormConverter::new();
		let payload = converter
			.read(
				Bytes::from_static(b"tag=a&tag=b&q=%C3%A9"),
				&MediaType::application_form_urlencoded(),
			)
			.await
			.unwrap();
		assert_eq!(
			payload,
			Payload::Form(vec![
				("tag".into(), "a".into()),
				("tag".into(), "b".into()),
				("q".into(), "é".into()),
			])
		);
	}

	#[rstest]
	fn test_only_form_media_type() {
		let converter = FormConverter::new();
		assert!(!converter.can_write(PayloadType::Form, Some(&MediaType::application_json())));
		assert!(converter.can_read(
			PayloadType::Form,
			Some(&MediaType::application_form_urlencoded().with_parameter("charset", "UTF-8"))
		));
	}
}
