//! Ordered converter selection
//!
//! The registry holds converters in precedence order. Writing picks the
//! first converter that handles the payload in the negotiated media type;
//! reading picks the first that handles the request's `Content-Type`.

use std::sync::Arc;

use bytes::Bytes;
use makas_negotiation::MediaType;

use crate::byte_array::ByteArrayConverter;
use crate::converter::MessageConverter;
use crate::error::{ConverterError, ConverterResult};
use crate::form::FormConverter;
use crate::json::{JsonConfig, JsonConverter};
use crate::payload::{Payload, PayloadType};
use crate::source::SourceConverter;
use crate::string::StringConverter;
use crate::xml::{XmlConfig, XmlConverter};

/// A written body and the `Content-Type` to send with it.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedBody {
	pub content_type: MediaType,
	pub body: Bytes,
}

/// Converters in precedence order
///
/// # Examples
///
/// ```
/// use makas_converters::{ConverterRegistry, JsonConverter, PayloadType};
/// use makas_negotiation::MediaType;
///
/// let registry = ConverterRegistry::new().register(JsonConverter::new());
///
/// let writer = registry
///     .select_writer(PayloadType::Object, &MediaType::application_json())
///     .unwrap();
/// assert_eq!(writer.name(), "json");
/// assert!(registry
///     .select_writer(PayloadType::Object, &MediaType::text_plain())
///     .is_err());
/// ```
#[derive(Clone, Default)]
pub struct ConverterRegistry {
	converters: Vec<Arc<dyn MessageConverter>>,
}

impl ConverterRegistry {
	/// Creates an empty registry
	pub fn new() -> Self {
		Self::default()
	}

	/// The standard converter set: bytes, strings, forms, XML sources,
	/// the XML marshaller, then JSON.
	pub fn with_defaults(json: JsonConfig, xml: XmlConfig) -> Self {
		Self::new()
			.register(ByteArrayConverter::new())
			.register(StringConverter::new())
			.register(FormConverter::new())
			.register(SourceConverter::new())
			.register(XmlConverter::with_config(xml))
			.register(JsonConverter::with_config(json))
	}

	/// Appends a converter, after every converter already registered
	pub fn register<C>(mut self, converter: C) -> Self
	where
		C: MessageConverter + 'static,
	{
		self.converters.push(Arc::new(converter));
		self
	}

	pub fn push(&mut self, converter: Arc<dyn MessageConverter>) {
		self.converters.push(converter);
	}

	pub fn len(&self) -> usize {
		self.converters.len()
	}

	pub fn is_empty(&self) -> bool {
		self.converters.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn MessageConverter>> {
		self.converters.iter()
	}

	/// Every media type some converter can produce, in registry order and
	/// without duplicates.
	pub fn supported_media_types(&self) -> Vec<MediaType> {
		let mut types: Vec<MediaType> = Vec::new();
		for media_type in self.converters.iter().flat_map(|c| c.supported_media_types()) {
			if !types.contains(&media_type) {
				types.push(media_type);
			}
		}
		types
	}

	pub fn select_writer(
		&self,
		payload_type: PayloadType,
		media_type: &MediaType,
	) -> ConverterResult<&Arc<dyn MessageConverter>> {
		self.converters
			.iter()
			.find(|c| c.can_write(payload_type, Some(media_type)))
			.ok_or_else(|| ConverterError::NoConverterFound {
				media_type: media_type.clone(),
				payload_type,
			})
	}

	pub fn select_reader(
		&self,
		payload_type: PayloadType,
		media_type: &MediaType,
	) -> ConverterResult<&Arc<dyn MessageConverter>> {
		self.converters
			.iter()
			.find(|c| c.can_read(payload_type, Some(media_type)))
			.ok_or_else(|| ConverterError::NoReaderFound {
				media_type: media_type.clone(),
				payload_type,
			})
	}

	/// Writes `payload` as `media_type` with the first capable converter.
	pub async fn write(
		&self,
		payload: &Payload,
		media_type: &MediaType,
	) -> ConverterResult<ConvertedBody> {
		let payload_type = payload.payload_type();
		let converter = match self.select_writer(payload_type, media_type) {
			Ok(converter) => converter,
			Err(e) => {
				tracing::debug!(%media_type, %payload_type, "no converter can write payload");
				return Err(e);
			}
		};
		tracing::trace!(converter = converter.name(), %media_type, "writing body");

		let body = converter.write(payload, media_type).await.inspect_err(|e| {
			tracing::warn!(converter = converter.name(), error = %e, "failed to write body");
		})?;
		Ok(ConvertedBody {
			content_type: converter.content_type(media_type),
			body,
		})
	}

	/// Reads `body` sent as `media_type` into a payload of `payload_type`.
	pub async fn read(
		&self,
		body: Bytes,
		media_type: &MediaType,
		payload_type: PayloadType,
	) -> ConverterResult<Payload> {
		let converter = match self.select_reader(payload_type, media_type) {
			Ok(converter) => converter,
			Err(e) => {
				tracing::debug!(%media_type, %payload_type, "no converter can read body");
				return Err(e);
			}
		};
		tracing::trace!(converter = converter.name(), %media_type, len = body.len(), "reading body");

		converter.read(body, media_type).await.inspect_err(|e| {
			tracing::debug!(converter = converter.name(), error = %e, "body conversion failed");
		})
	}
}

impl std::fmt::Debug for ConverterRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ConverterRegistry")
			.field(
				"converters",
				&self.converters.iter().map(|c| c.name()).collect::<Vec<_>>(),
			)
			.finish()
	}
}
