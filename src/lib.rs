//! # makas-web
//!
//! Content negotiation and HTTP message conversion.
//!
//! Every request gets exactly one response representation. The negotiator
//! looks at the path extension (`/orders/7.json`), an optional query
//! parameter (`?mediaType=xml`) and the `Accept` header, in that order, and
//! falls back to `application/xml`. The converter registry then writes the
//! handler's payload in that media type, or answers `406 Not Acceptable`
//! when nothing can.
//!
//! ## Crates
//!
//! - [`negotiation`] (`makas-negotiation`): media types, Accept parsing,
//!   negotiation strategies
//! - [`converters`] (`makas-converters`): byte, string, form, XML and JSON
//!   converters and their registry
//!
//! This crate ties them together with file-based configuration
//! ([`WebConfig`]), logging setup ([`logging::init`]) and the
//! [`RepresentationService`] used by request handlers.
//!
//! ## Quick start
//!
//! ```
//! use makas::WebConfig;
//! use makas_converters::Payload;
//! use serde_json::json;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let config = WebConfig::from_toml_str("[xml]\ndeclaration = false").unwrap();
//! makas::logging::init(&config.logging);
//! let service = config.build_service().unwrap();
//!
//! let request = http::Request::get("/orders/7").body(()).unwrap();
//! let response = service.respond(&request, &Payload::Object(json!({"id": 7}))).await;
//!
//! assert_eq!(response.headers()["content-type"], "application/xml");
//! assert_eq!(response.body().as_ref(), b"<response><id>7</id></response>");
//! # });
//! ```

pub mod config;
pub mod logging;
pub mod service;

pub use makas_converters as converters;
pub use makas_negotiation as negotiation;

pub use config::{WebConfig, WebConfigError};
pub use logging::{LogFormat, LoggingConfig};
pub use service::{RepresentationService, ServiceError};

pub use makas_converters::{ConverterError, ConverterRegistry, MessageConverter, Payload, PayloadType};
pub use makas_negotiation::{ContentNegotiator, MediaType, NegotiationRequest};
