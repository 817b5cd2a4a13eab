//! Pre-serialized XML documents

use async_trait::async_trait;
use bytes::Bytes;
use makas_negotiation::MediaType;
use quick_xml::Reader;
use quick_xml::events::Event;

use crate::converter::{MessageConverter, unsupported};
use crate::error::{ConverterError, ConverterResult};
use crate::payload::{Payload, PayloadType};

/// Sends and receives XML documents that are already serialized.
///
/// Documents are checked for well-formedness in both directions but are
/// otherwise left byte-for-byte as given.
#[derive(Debug, Clone, Default)]
pub struct SourceConverter;

impl SourceConverter {
	pub fn new() -> Self {
		Self
	}
}

/// Scans a document to the end, reporting the first syntax error.
pub(crate) fn check_well_formed(document: &str) -> Result<(), String> {
	let mut reader = Reader::from_str(document);
	reader.config_mut().check_end_names = true;
	let mut depth = 0usize;
	let mut roots = 0usize;
	loop {
		match reader.read_event() {
			Ok(Event::Start(_)) => {
				if depth == 0 {
					roots += 1;
				}
				depth += 1;
			}
			Ok(Event::End(_)) => depth = depth.saturating_sub(1),
			Ok(Event::Empty(_)) if depth == 0 => roots += 1,
			Ok(Event::Eof) => break,
			Ok(_) => {}
			Err(e) => return Err(e.to_string()),
		}
	}
	match (roots, depth) {
		(1, 0) => Ok(()),
		(0, _) => Err("document has no root element".to_string()),
		(_, 0) => Err("document has more than one root element".to_string()),
		_ => Err("unexpected end of document".to_string()),
	}
}

#[async_trait]
impl MessageConverter for SourceConverter {
	fn name(&self) -> &'static str {
		"xml source"
	}

	fn payload_type(&self) -> PayloadType {
		PayloadType::XmlSource
	}

	fn supported_media_types(&self) -> Vec<MediaType> {
		vec![
			MediaType::application_xml(),
			MediaType::text_xml(),
			MediaType::new("application", "*+xml"),
		]
	}

	async fn write(&self, payload: &Payload, _media_type: &MediaType) -> ConverterResult<Bytes> {
		match payload {
			Payload::XmlSource(document) => {
				check_well_formed(document).map_err(ConverterError::Serialization)?;
				Ok(Bytes::copy_from_slice(document.as_bytes()))
			}
			other => Err(unsupported(self.name(), other)),
		}
	}

	async fn read(&self, body: Bytes, media_type: &MediaType) -> ConverterResult<Payload> {
		let document = String::from_utf8(body.to_vec())
			.map_err(|e| ConverterError::malformed(media_type, e.to_string()))?;
		check_well_formed(&document).map_err(|e| ConverterError::malformed(media_type, e))?;
		Ok(Payload::XmlSource(document))
	}
}
