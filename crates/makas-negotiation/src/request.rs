//! The request facts negotiation looks at

use std::borrow::Cow;

use http::{HeaderMap, Uri, header};

/// Borrowed view of the three request hints negotiation uses: the path, the
/// query string and the Accept header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NegotiationRequest<'a> {
	pub path: Option<&'a str>,
	/// Raw query string, without the leading `?`.
	pub query: Option<&'a str>,
	pub accept: Option<Cow<'a, str>>,
}

impl<'a> NegotiationRequest<'a> {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_path(mut self, path: &'a str) -> Self {
		self.path = Some(path);
		self
	}

	pub fn with_query(mut self, query: &'a str) -> Self {
		self.query = Some(query);
		self
	}

	pub fn with_accept(mut self, accept: &'a str) -> Self {
		self.accept = Some(Cow::Borrowed(accept));
		self
	}

	/// Builds the view from an `http::Request`
	///
	/// Several Accept headers are joined as if they were one comma-separated
	/// list. Header values that are not visible ASCII are ignored.
	///
	/// # Examples
	///
	/// ```
	/// use makas_negotiation::NegotiationRequest;
	///
	/// let request = http::Request::builder()
	///     .uri("/orders/42.json?mediaType=xml")
	///     .header("Accept", "text/html")
	///     .body(())
	///     .unwrap();
	///
	/// let view = NegotiationRequest::from_http(&request);
	/// assert_eq!(view.path, Some("/orders/42.json"));
	/// assert_eq!(view.query, Some("mediaType=xml"));
	/// assert_eq!(view.accept.as_deref(), Some("text/html"));
	/// ```
	pub fn from_http<B>(request: &'a http::Request<B>) -> Self {
		Self::from_uri_and_headers(request.uri(), request.headers())
	}

	pub fn from_parts(parts: &'a http::request::Parts) -> Self {
		Self::from_uri_and_headers(&parts.uri, &parts.headers)
	}

	pub fn from_uri_and_headers(uri: &'a Uri, headers: &'a HeaderMap) -> Self {
		Self {
			path: Some(uri.path()),
			query: uri.query(),
			accept: accept_header(headers),
		}
	}

	pub fn accept(&self) -> Option<&str> {
		self.accept.as_deref()
	}
}

fn accept_header(headers: &HeaderMap) -> Option<Cow<'_, str>> {
	let mut values = headers
		.get_all(header::ACCEPT)
		.iter()
		.filter_map(|value| value.to_str().ok());
	let first = values.next()?;
	let rest: Vec<&str> = values.collect();
	if rest.is_empty() {
		return Some(Cow::Borrowed(first));
	}
	let mut joined = first.to_string();
	for value in rest {
		joined.push_str(", ");
		joined.push_str(value);
	}
	Some(Cow::Owned(joined))
}
