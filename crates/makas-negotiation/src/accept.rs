//! Accept header parsing

use crate::error::MediaTypeError;
use crate::media_type::MediaType;

/// One entry of an Accept header: a media type and its weight.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRange {
	pub media_type: MediaType,
	/// Quality factor (0.0 to 1.0)
	pub quality: f32,
}

impl MediaRange {
	pub fn new(media_type: MediaType) -> Self {
		Self {
			media_type,
			quality: 1.0,
		}
	}

	pub fn with_quality(media_type: MediaType, quality: f32) -> Self {
		Self {
			media_type,
			quality,
		}
	}

	/// Parses a single media range such as `application/json;q=0.5`
	///
	/// A `q` outside `0.0..=1.0`, or one that is not a number, makes the
	/// whole entry invalid.
	///
	/// # Examples
	///
	/// ```
	/// use makas_negotiation::accept::MediaRange;
	///
	/// let range = MediaRange::parse("application/json; q=0.5").unwrap();
	/// assert_eq!(range.media_type.subtype, "json");
	/// assert_eq!(range.quality, 0.5);
	///
	/// assert!(MediaRange::parse("application/json;q=2").is_err());
	/// ```
	pub fn parse(s: &str) -> Result<Self, MediaTypeError> {
		let (mut media_type, parameters) = MediaType::parse_with_raw_parameters(s)?;
		let mut quality = 1.0;
		for (name, value) in parameters {
			if name == "q" {
				quality = parse_quality(&value)?;
			} else {
				media_type = media_type.with_parameter(name, value);
			}
		}
		Ok(Self {
			media_type,
			quality,
		})
	}

	/// `*/*` carries no preference of its own.
	pub fn is_any(&self) -> bool {
		self.media_type.is_wildcard_type()
	}

	pub fn is_acceptable(&self) -> bool {
		self.quality > 0.0
	}
}

fn parse_quality(value: &str) -> Result<f32, MediaTypeError> {
	match value.parse::<f32>() {
		Ok(q) if (0.0..=1.0).contains(&q) => Ok(q),
		_ => Err(MediaTypeError::InvalidQuality(value.to_string())),
	}
}

/// Represents an Accept header
#[derive(Debug, Clone, Default)]
pub struct AcceptHeader {
	/// Valid entries, highest quality first. Equal weights keep header order.
	pub ranges: Vec<MediaRange>,
}

impl AcceptHeader {
	/// Parses an Accept header string, skipping malformed entries
	///
	/// # Examples
	///
	/// ```
	/// use makas_negotiation::accept::AcceptHeader;
	///
	/// let accept = AcceptHeader::parse("application/json;q=0.5, bogus, application/xml;q=0.9");
	/// assert_eq!(accept.ranges.len(), 2);
	/// assert_eq!(accept.ranges[0].media_type.subtype, "xml");
	/// assert_eq!(accept.ranges[1].media_type.subtype, "json");
	/// ```
	pub fn parse(header: &str) -> Self {
		let mut ranges: Vec<MediaRange> = header
			.split(',')
			.map(str::trim)
			.filter(|entry| !entry.is_empty())
			.filter_map(|entry| match MediaRange::parse(entry) {
				Ok(range) => Some(range),
				Err(error) => {
					tracing::trace!(entry, %error, "skipping malformed Accept entry");
					None
				}
			})
			.collect();

		// sort_by is stable, ties stay in header order
		ranges.sort_by(|a, b| b.quality.total_cmp(&a.quality));

		Self { ranges }
	}

	pub fn empty() -> Self {
		Self::default()
	}

	pub fn is_empty(&self) -> bool {
		self.ranges.is_empty()
	}

	/// True when the header states no preference at all: empty, or only `*/*`.
	pub fn is_any(&self) -> bool {
		self.ranges.iter().all(MediaRange::is_any)
	}

	/// Finds the best matching media type from the available ones
	///
	/// Ranges are tried highest weight first. A concrete range, or a partial
	/// wildcard such as `text/*`, picks the first available type it is
	/// compatible with. Ranges with `q=0` and bare `*/*` never pick anything;
	/// `*/*` is left to the caller's default.
	///
	/// # Examples
	///
	/// ```
	/// use makas_negotiation::accept::AcceptHeader;
	/// use makas_negotiation::MediaType;
	///
	/// let available = vec![MediaType::application_xml(), MediaType::text_xml()];
	///
	/// let accept = AcceptHeader::parse("text/*, application/json");
	/// assert_eq!(accept.find_best_match(&available), Some(MediaType::text_xml()));
	///
	/// let any = AcceptHeader::parse("*/*");
	/// assert_eq!(any.find_best_match(&available), None);
	/// ```
	pub fn find_best_match(&self, available: &[MediaType]) -> Option<MediaType> {
		self.ranges
			.iter()
			.filter(|range| range.is_acceptable() && !range.is_any())
			.find_map(|range| {
				available
					.iter()
					.find(|candidate| range.media_type.is_compatible_with(candidate))
					.cloned()
			})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_parse_accept_header() {
		let accept = AcceptHeader::parse("application/json, text/html; q=0.9");
		assert_eq!(accept.ranges.len(), 2);
		assert_eq!(accept.ranges[0].quality, 1.0);
		assert_eq!(accept.ranges[1].quality, 0.9);
	}

	#[rstest]
	fn test_equal_weights_keep_header_order() {
		let accept = AcceptHeader::parse("text/xml;q=0.8, application/json, application/xml;q=0.8");
		let order: Vec<String> = accept
			.ranges
			.iter()
			.map(|r| r.media_type.essence())
			.collect();
		assert_eq!(order, vec!["application/json", "text/xml", "application/xml"]);
	}

	#[rstest]
	#[case("application/json;q=abc")]
	#[case("application/json;q=1.5")]
	#[case("application/json;q=-0.1")]
	#[case("json")]
	#[case("/json")]
	#[case("*/xml")]
	fn test_malformed_entries_are_skipped(#[case] bad: &str) {
		let header = format!("{}, application/xml;q=0.2", bad);
		let accept = AcceptHeader::parse(&header);
		assert_eq!(accept.ranges.len(), 1);
		assert_eq!(accept.ranges[0].media_type, MediaType::application_xml());
	}

	#[rstest]
	fn test_non_q_parameters_stay_on_the_media_type() {
		let range = MediaRange::parse("text/plain; charset=utf-8; q=0.3").unwrap();
		assert_eq!(range.quality, 0.3);
		assert_eq!(range.media_type.parameter("charset"), Some("utf-8"));
		assert_eq!(range.media_type.parameter("q"), None);
	}

	#[rstest]
	fn test_zero_quality_is_never_selected() {
		let accept = AcceptHeader::parse("application/json;q=0, application/xml;q=0.1");
		let available = vec![MediaType::application_json(), MediaType::application_xml()];
		assert_eq!(
			accept.find_best_match(&available),
			Some(MediaType::application_xml())
		);
	}

	#[rstest]
	fn test_find_best_match_prefers_weight() {
		let accept = AcceptHeader::parse("application/json;q=0.5,application/xml;q=0.9");
		let available = vec![MediaType::application_json(), MediaType::application_xml()];
		assert_eq!(
			accept.find_best_match(&available),
			Some(MediaType::application_xml())
		);
	}

	#[rstest]
	fn test_find_best_match_returns_available_form() {
		let accept = AcceptHeader::parse("application/json;charset=utf-8");
		let available = vec![MediaType::application_json()];
		assert_eq!(
			accept.find_best_match(&available),
			Some(MediaType::application_json())
		);
	}

	#[rstest]
	fn test_find_best_match_none() {
		let accept = AcceptHeader::parse("image/png");
		let available = vec![MediaType::application_json()];
		assert!(accept.find_best_match(&available).is_none());
	}

	#[rstest]
	#[case("", true)]
	#[case("*/*", true)]
	#[case("*/*;q=0.8, */*", true)]
	#[case("*/*, text/html", false)]
	fn test_is_any(#[case] header: &str, #[case] expected: bool) {
		assert_eq!(AcceptHeader::parse(header).is_any(), expected);
	}
}
