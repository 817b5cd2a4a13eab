//! # makas-converters
//!
//! HTTP message converters for makas-web.
//!
//! A [`MessageConverter`] turns one kind of [`Payload`] into a body of some
//! media types and back. The [`ConverterRegistry`] keeps converters in
//! precedence order and picks the first one able to handle a payload in the
//! media type chosen by content negotiation.
//!
//! | Converter | Payload | Media types |
//! |---|---|---|
//! | [`ByteArrayConverter`] | bytes | `application/octet-stream`, `*/*` |
//! | [`StringConverter`] | text | `text/plain`, `*/*` |
//! | [`FormConverter`] | form fields | `application/x-www-form-urlencoded` |
//! | [`SourceConverter`] | XML document | `application/xml`, `text/xml`, `application/*+xml` |
//! | [`XmlConverter`] | object | `application/xml`, `text/xml` |
//! | [`JsonConverter`] | object | `application/json`, `text/json` |
//!
//! ## Example
//!
//! ```
//! use makas_converters::{ConverterRegistry, JsonConfig, Payload, XmlConfig};
//! use makas_negotiation::MediaType;
//! use serde_json::json;
//!
//! # tokio_test_block(async {
//! let registry = ConverterRegistry::with_defaults(
//!     JsonConfig::default(),
//!     XmlConfig::builder().declaration(false).build(),
//! );
//! let written = registry
//!     .write(&Payload::Object(json!({"id": 7})), &MediaType::application_xml())
//!     .await
//!     .unwrap();
//! assert_eq!(written.content_type, MediaType::application_xml());
//! assert_eq!(written.body.as_ref(), b"<response><id>7</id></response>");
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

pub mod byte_array;
pub mod converter;
pub mod error;
pub mod form;
pub mod json;
pub mod payload;
pub mod registry;
pub mod source;
pub mod string;
pub mod xml;

pub use byte_array::ByteArrayConverter;
pub use converter::MessageConverter;
pub use error::{ConverterError, ConverterResult};
pub use form::FormConverter;
pub use json::{JsonConfig, JsonConverter};
pub use payload::{Payload, PayloadType};
pub use registry::{ConvertedBody, ConverterRegistry};
pub use source::SourceConverter;
pub use string::{DEFAULT_CHARSET, StringConverter};
pub use xml::{XmlConfig, XmlConfigBuilder, XmlConverter};
