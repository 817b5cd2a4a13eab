//! Response and request payloads

use std::fmt;

use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ConverterError, ConverterResult};

/// The kind of value a converter produces or consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadType {
	/// Raw bytes, passed through untouched.
	Bytes,
	/// A string, encoded with the media type's charset.
	Text,
	/// Ordered form fields.
	Form,
	/// An already serialized XML document.
	XmlSource,
	/// A structured value handed to the JSON or XML marshaller.
	Object,
}

impl PayloadType {
	pub fn as_str(&self) -> &'static str {
		match self {
			PayloadType::Bytes => "bytes",
			PayloadType::Text => "text",
			PayloadType::Form => "form",
			PayloadType::XmlSource => "xml source",
			PayloadType::Object => "object",
		}
	}
}

impl fmt::Display for PayloadType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A body in its in-memory form.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
	Bytes(Bytes),
	Text(String),
	Form(Vec<(String, String)>),
	XmlSource(String),
	Object(Value),
}

impl Payload {
	pub fn payload_type(&self) -> PayloadType {
		match self {
			Payload::Bytes(_) => PayloadType::Bytes,
			Payload::Text(_) => PayloadType::Text,
			Payload::Form(_) => PayloadType::Form,
			Payload::XmlSource(_) => PayloadType::XmlSource,
			Payload::Object(_) => PayloadType::Object,
		}
	}

	/// Wraps any serializable value as an object payload
	///
	/// # Examples
	///
	/// ```
	/// use makas_converters::{Payload, PayloadType};
	/// use serde::Serialize;
	///
	/// #[derive(Serialize)]
	/// struct Order { id: u32 }
	///
	/// let payload = Payload::object(&Order { id: 7 }).unwrap();
	/// assert_eq!(payload.payload_type(), PayloadType::Object);
	/// ```
	pub fn object<T: Serialize + ?Sized>(value: &T) -> ConverterResult<Self> {
		serde_json::to_value(value)
			.map(Payload::Object)
			.map_err(|e| ConverterError::Serialization(e.to_string()))
	}

	/// Turns an object payload back into a typed value.
	pub fn into_object<T: DeserializeOwned>(self) -> ConverterResult<T> {
		match self {
			Payload::Object(value) => serde_json::from_value(value)
				.map_err(|e| ConverterError::Serialization(e.to_string())),
			other => Err(ConverterError::UnsupportedPayload {
				converter: "object mapping",
				actual: other.payload_type(),
			}),
		}
	}

	pub fn as_text(&self) -> Option<&str> {
		match self {
			Payload::Text(text) | Payload::XmlSource(text) => Some(text),
			_ => None,
		}
	}
}

impl From<Bytes> for Payload {
	fn from(bytes: Bytes) -> Self {
		Payload::Bytes(bytes)
	}
}

impl From<String> for Payload {
	fn from(text: String) -> Self {
		Payload::Text(text)
	}
}

impl From<&str> for Payload {
	fn from(text: &str) -> Self {
		Payload::Text(text.to_string())
	}
}

impl From<Value> for Payload {
	fn from(value: Value) -> Self {
		Payload::Object(value)
	}
}
