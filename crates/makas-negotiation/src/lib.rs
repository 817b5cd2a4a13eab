//! # makas-negotiation
//!
//! Content negotiation for makas-web.
//!
//! A [`ContentNegotiator`] picks exactly one response [`MediaType`] per
//! request, trying its strategies in priority order:
//!
//! - **path extension**: `/orders/42.json` -> `application/json`
//! - **query parameter** (off by default): `?mediaType=xml`
//! - **Accept header**: highest-weighted entry in the supported set
//!
//! and falling back to the configured default when none of them recognizes
//! anything. Unknown extensions and malformed Accept entries are never errors.
//!
//! ## Example
//!
//! ```
//! use makas_negotiation::{ContentNegotiator, MediaType, NegotiationRequest};
//!
//! let negotiator = ContentNegotiator::default();
//! let request = NegotiationRequest::new()
//!     .with_path("/orders")
//!     .with_accept("application/json;q=0.5,application/xml;q=0.9");
//!
//! assert_eq!(negotiator.negotiate(&request), MediaType::application_xml());
//! ```

pub mod accept;
pub mod config;
pub mod error;
pub mod mappings;
pub mod media_type;
pub mod negotiator;
pub mod request;
pub mod strategy;

pub use accept::{AcceptHeader, MediaRange};
pub use config::{DEFAULT_PARAMETER_NAME, NegotiationConfig, NegotiationConfigBuilder};
pub use error::{ConfigError, MediaTypeError};
pub use mappings::MediaTypeMappings;
pub use media_type::MediaType;
pub use negotiator::{ContentNegotiator, NegotiationOutcome, Resolution};
pub use request::NegotiationRequest;
pub use strategy::{
	HeaderStrategy, NegotiationStrategy, ParameterStrategy, PathExtensionStrategy, StrategyKind,
};
