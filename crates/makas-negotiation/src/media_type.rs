//! Media type representation and wildcard matching

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::MediaTypeError;

/// A MIME type/subtype pair with optional parameters.
///
/// Type and subtype are stored lower-case, so `Application/JSON` and
/// `application/json` compare equal. Parameter names are lower-cased as well;
/// parameter values keep their case.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaType {
	pub main_type: String,
	pub subtype: String,
	pub parameters: Vec<(String, String)>,
}

impl MediaType {
	/// Creates a media type without parameters
	///
	/// # Examples
	///
	/// ```
	/// use makas_negotiation::MediaType;
	///
	/// let json = MediaType::new("Application", "JSON");
	/// assert_eq!(json.main_type, "application");
	/// assert_eq!(json.subtype, "json");
	/// assert_eq!(json.to_string(), "application/json");
	/// ```
	pub fn new(main_type: impl Into<String>, subtype: impl Into<String>) -> Self {
		Self {
			main_type: main_type.into().to_ascii_lowercase(),
			subtype: subtype.into().to_ascii_lowercase(),
			parameters: Vec::new(),
		}
	}

	/// Adds (or replaces) a parameter
	///
	/// # Examples
	///
	/// ```
	/// use makas_negotiation::MediaType;
	///
	/// let text = MediaType::new("text", "plain").with_parameter("charset", "UTF-8");
	/// assert_eq!(text.parameter("charset"), Some("UTF-8"));
	/// assert_eq!(text.to_string(), "text/plain;charset=UTF-8");
	/// ```
	pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		let name = name.into().to_ascii_lowercase();
		let value = value.into();
		match self.parameters.iter_mut().find(|(k, _)| *k == name) {
			Some(existing) => existing.1 = value,
			None => self.parameters.push((name, value)),
		}
		self
	}

	/// Parses a media type, returning `None` when it is malformed
	///
	/// # Examples
	///
	/// ```
	/// use makas_negotiation::MediaType;
	///
	/// assert!(MediaType::parse("application/xml").is_some());
	/// assert!(MediaType::parse("xml").is_none());
	/// ```
	pub fn parse(s: &str) -> Option<Self> {
		s.parse().ok()
	}

	pub fn parameter(&self, name: &str) -> Option<&str> {
		self.parameters
			.iter()
			.find(|(k, _)| k.eq_ignore_ascii_case(name))
			.map(|(_, v)| v.as_str())
	}

	/// Returns a copy without any parameters.
	pub fn without_parameters(&self) -> Self {
		Self::new(self.main_type.clone(), self.subtype.clone())
	}

	/// `type/subtype` without parameters.
	pub fn essence(&self) -> String {
		format!("{}/{}", self.main_type, self.subtype)
	}

	pub fn is_wildcard_type(&self) -> bool {
		self.main_type == "*"
	}

	/// True for `type/*` and for structured-suffix wildcards like `*+json`.
	pub fn is_wildcard_subtype(&self) -> bool {
		self.subtype == "*" || self.subtype.starts_with("*+")
	}

	pub fn is_concrete(&self) -> bool {
		!self.is_wildcard_type() && !self.is_wildcard_subtype()
	}

	/// The structured syntax suffix, `json` for `application/vnd.api+json`.
	pub fn suffix(&self) -> Option<&str> {
		self.subtype.rsplit_once('+').map(|(_, suffix)| suffix)
	}

	/// Whether this media type (read as a range) includes `other`.
	///
	/// Parameters are ignored.
	///
	/// # Examples
	///
	/// ```
	/// use makas_negotiation::MediaType;
	///
	/// let any_json = MediaType::new("application", "*+json");
	/// assert!(any_json.includes(&MediaType::new("application", "vnd.api+json")));
	/// assert!(any_json.includes(&MediaType::new("application", "json")));
	/// assert!(!any_json.includes(&MediaType::new("application", "xml")));
	///
	/// let text = MediaType::new("text", "*");
	/// assert!(text.includes(&MediaType::new("text", "xml")));
	/// assert!(!MediaType::new("text", "xml").includes(&text));
	/// ```
	pub fn includes(&self, other: &MediaType) -> bool {
		if self.is_wildcard_type() {
			return true;
		}
		if self.main_type != other.main_type {
			return false;
		}
		if self.subtype == other.subtype || self.subtype == "*" {
			return true;
		}
		if let Some(suffix) = self.subtype.strip_prefix("*+") {
			return other.suffix() == Some(suffix) || other.subtype == suffix;
		}
		false
	}

	/// Symmetric form of [`includes`](Self::includes).
	pub fn is_compatible_with(&self, other: &MediaType) -> bool {
		self.includes(other) || other.includes(self)
	}

	pub fn all() -> Self {
		Self::new("*", "*")
	}

	pub fn application_json() -> Self {
		Self::new("application", "json")
	}

	pub fn application_xml() -> Self {
		Self::new("application", "xml")
	}

	pub fn text_json() -> Self {
		Self::new("text", "json")
	}

	pub fn text_xml() -> Self {
		Self::new("text", "xml")
	}

	pub fn text_plain() -> Self {
		Self::new("text", "plain")
	}

	pub fn application_octet_stream() -> Self {
		Self::new("application", "octet-stream")
	}

	pub fn application_form_urlencoded() -> Self {
		Self::new("application", "x-www-form-urlencoded")
	}

	/// Parses `type/subtype;k=v` and hands back the raw parameters, `q`
	/// included, so that media ranges can pull their weight out of them.
	pub(crate) fn parse_with_raw_parameters(
		s: &str,
	) -> Result<(Self, Vec<(String, String)>), MediaTypeError> {
		let mut parts = s.split(';');
		let essence = parts.next().map(str::trim).unwrap_or_default();
		if essence.is_empty() {
			return Err(MediaTypeError::Empty);
		}

		let (main_type, subtype) = essence
			.split_once('/')
			.ok_or_else(|| MediaTypeError::MissingSubtype(essence.to_string()))?;
		let main_type = main_type.trim();
		let subtype = subtype.trim();
		if subtype.is_empty() {
			return Err(MediaTypeError::MissingSubtype(essence.to_string()));
		}
		if !is_token(main_type) || !is_token(subtype) {
			return Err(MediaTypeError::InvalidToken(essence.to_string()));
		}
		if main_type == "*" && subtype != "*" {
			return Err(MediaTypeError::WildcardType(essence.to_string()));
		}

		let mut parameters = Vec::new();
		for param in parts {
			let param = param.trim();
			if param.is_empty() {
				continue;
			}
			let (name, value) = param
				.split_once('=')
				.ok_or_else(|| MediaTypeError::InvalidParameter(param.to_string()))?;
			let name = name.trim();
			if !is_token(name) {
				return Err(MediaTypeError::InvalidParameter(param.to_string()));
			}
			let value = value.trim();
			let value = value
				.strip_prefix('"')
				.and_then(|v| v.strip_suffix('"'))
				.unwrap_or(value);
			parameters.push((name.to_ascii_lowercase(), value.to_string()));
		}

		Ok((Self::new(main_type, subtype), parameters))
	}
}

impl FromStr for MediaType {
	type Err = MediaTypeError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let (media_type, parameters) = Self::parse_with_raw_parameters(s)?;
		Ok(parameters
			.into_iter()
			.fold(media_type, |mt, (k, v)| mt.with_parameter(k, v)))
	}
}

impl fmt::Display for MediaType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}/{}", self.main_type, self.subtype)?;
		for (name, value) in &self.parameters {
			write!(f, ";{}={}", name, value)?;
		}
		Ok(())
	}
}

impl Serialize for MediaType {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

impl<'de> Deserialize<'de> for MediaType {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let raw = String::deserialize(deserializer)?;
		raw.parse().map_err(serde::de::Error::custom)
	}
}

// RFC 9110 tchar
fn is_token(s: &str) -> bool {
	!s.is_empty()
		&& s
			.bytes()
			.all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b))
}
