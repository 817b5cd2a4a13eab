//! File extension to media type table

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ConfigError;
use crate::media_type::MediaType;

/// Ordered `extension -> media type` table shared by the path extension and
/// query parameter strategies.
///
/// Keys are stored lower-case and looked up case-insensitively. Insertion
/// order is kept; it is the order of the negotiator's supported set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaTypeMappings {
	entries: Vec<(String, MediaType)>,
}

impl MediaTypeMappings {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a mapping, replacing an existing one for the same extension
	///
	/// # Examples
	///
	/// ```
	/// use makas_negotiation::{MediaType, MediaTypeMappings};
	///
	/// let mut mappings = MediaTypeMappings::new();
	/// mappings.insert("XML", MediaType::application_xml());
	/// assert_eq!(mappings.lookup("xml"), Some(&MediaType::application_xml()));
	/// assert_eq!(mappings.lookup("Xml"), Some(&MediaType::application_xml()));
	/// assert_eq!(mappings.lookup("json"), None);
	/// ```
	pub fn insert(&mut self, extension: impl Into<String>, media_type: MediaType) {
		let extension = extension.into().to_ascii_lowercase();
		match self.entries.iter_mut().find(|(ext, _)| *ext == extension) {
			Some(entry) => entry.1 = media_type,
			None => self.entries.push((extension, media_type)),
		}
	}

	pub fn lookup(&self, extension: &str) -> Option<&MediaType> {
		self.entries
			.iter()
			.find(|(ext, _)| ext.eq_ignore_ascii_case(extension))
			.map(|(_, media_type)| media_type)
	}

	/// Distinct media types, in insertion order.
	pub fn media_types(&self) -> Vec<MediaType> {
		let mut distinct: Vec<MediaType> = Vec::with_capacity(self.entries.len());
		for (_, media_type) in &self.entries {
			if !distinct.contains(media_type) {
				distinct.push(media_type.clone());
			}
		}
		distinct
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &MediaType)> {
		self.entries.iter().map(|(ext, mt)| (ext.as_str(), mt))
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub(crate) fn validate(&self) -> Result<(), ConfigError> {
		for (ext, _) in &self.entries {
			if ext.is_empty() || ext.contains(['.', '/']) {
				return Err(ConfigError::InvalidExtension(ext.clone()));
			}
		}
		Ok(())
	}
}

impl<E: Into<String>> FromIterator<(E, MediaType)> for MediaTypeMappings {
	fn from_iter<I: IntoIterator<Item = (E, MediaType)>>(iter: I) -> Self {
		let mut mappings = Self::new();
		for (ext, media_type) in iter {
			mappings.insert(ext, media_type);
		}
		mappings
	}
}

impl Serialize for MediaTypeMappings {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let mut map = serializer.serialize_map(Some(self.entries.len()))?;
		for (ext, media_type) in &self.entries {
			map.serialize_entry(ext, media_type)?;
		}
		map.end()
	}
}

impl<'de> Deserialize<'de> for MediaTypeMappings {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		struct MappingsVisitor;

		impl<'de> Visitor<'de> for MappingsVisitor {
			type Value = MediaTypeMappings;

			fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.write_str("a table of file extensions to media types")
			}

			fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
				let mut mappings = MediaTypeMappings::new();
				while let Some((ext, media_type)) = access.next_entry::<String, MediaType>()? {
					mappings.insert(ext, media_type);
				}
				Ok(mappings)
			}
		}

		deserializer.deserialize_map(MappingsVisitor)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_media_types_are_distinct_and_ordered() {
		let mappings: MediaTypeMappings = [
			("xml", MediaType::application_xml()),
			("json", MediaType::application_json()),
			("rss", MediaType::application_xml()),
		]
		.into_iter()
		.collect();

		assert_eq!(mappings.len(), 3);
		assert_eq!(
			mappings.media_types(),
			vec![MediaType::application_xml(), MediaType::application_json()]
		);
	}

	#[rstest]
	fn test_insert_replaces() {
		let mut mappings = MediaTypeMappings::new();
		mappings.insert("json", MediaType::text_json());
		mappings.insert("JSON", MediaType::application_json());
		assert_eq!(mappings.len(), 1);
		assert_eq!(mappings.lookup("json"), Some(&MediaType::application_json()));
	}

	#[rstest]
	#[case("")]
	#[case(".xml")]
	#[case("a/b")]
	fn test_validate_rejects_bad_extensions(#[case] ext: &str) {
		let mut mappings = MediaTypeMappings::new();
		mappings.insert(ext, MediaType::application_xml());
		assert!(matches!(
			mappings.validate(),
			Err(ConfigError::InvalidExtension(_))
		));
	}

	#[rstest]
	fn test_deserialize_from_json_map() {
		let mappings: MediaTypeMappings =
			serde_json::from_str(r#"{"xml": "application/xml", "json": "application/json"}"#)
				.unwrap();
		assert_eq!(mappings.lookup("json"), Some(&MediaType::application_json()));
		assert!(serde_json::from_str::<MediaTypeMappings>(r#"{"x": "nope"}"#).is_err());
	}
}
