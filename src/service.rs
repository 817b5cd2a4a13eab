//! Negotiated rendering and body reading for request handlers

use std::sync::Arc;

use bytes::Bytes;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, Request, Response, StatusCode};
use makas_converters::{ConverterError, ConverterRegistry, MessageConverter, Payload, PayloadType};
use makas_negotiation::{ContentNegotiator, MediaType, NegotiationRequest};
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ServiceError {
	#[error(transparent)]
	Conversion(#[from] ConverterError),

	#[error("invalid Content-Type header: {0}")]
	InvalidContentType(String),

	#[error("failed to build response: {0}")]
	Response(#[from] http::Error),
}

impl ServiceError {
	pub fn status_code(&self) -> StatusCode {
		match self {
			ServiceError::Conversion(e) => e.status_code(),
			ServiceError::InvalidContentType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
			ServiceError::Response(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	pub fn is_client_error(&self) -> bool {
		self.status_code().is_client_error()
	}

	/// A plain-text response for this error. Server errors only carry the
	/// status reason.
	pub fn to_response(&self) -> Response<Bytes> {
		let status = self.status_code();
		let message = if status.is_server_error() {
			tracing::warn!(error = %self, "request failed");
			status.canonical_reason().unwrap_or("error").to_string()
		} else {
			tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
			self.to_string()
		};

		let mut response = Response::new(Bytes::from(message));
		*response.status_mut() = status;
		response.headers_mut().insert(
			CONTENT_TYPE,
			HeaderValue::from_static("text/plain; charset=utf-8"),
		);
		response
	}
}

/// Picks the response representation for each request and converts
/// bodies in both directions.
///
/// Cloning is cheap; clones share the same negotiator and registry.
///
/// # Examples
///
/// ```
/// use bytes::Bytes;
/// use makas::{RepresentationService, WebConfig};
/// use makas_converters::Payload;
/// use serde_json::json;
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let service = WebConfig::default().build_service().unwrap();
/// let request = http::Request::get("/orders/7.json").body(()).unwrap();
///
/// let response = service
///     .render(&request, &Payload::Object(json!({"id": 7})))
///     .await
///     .unwrap();
/// assert_eq!(response.headers()["content-type"], "application/json");
/// assert_eq!(response.body(), &Bytes::from_static(br#"{"id":7}"#));
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct RepresentationService {
	negotiator: Arc<ContentNegotiator>,
	converters: Arc<ConverterRegistry>,
}

impl RepresentationService {
	pub fn new(negotiator: ContentNegotiator, converters: ConverterRegistry) -> Self {
		Self {
			negotiator: Arc::new(negotiator),
			converters: Arc::new(converters),
		}
	}

	pub fn negotiator(&self) -> &ContentNegotiator {
		&self.negotiator
	}

	pub fn converters(&self) -> &ConverterRegistry {
		&self.converters
	}

	/// The negotiated media type and the converter that will write a
	/// payload of `payload_type` in it.
	pub fn select_converter(
		&self,
		request: &NegotiationRequest<'_>,
		payload_type: PayloadType,
	) -> Result<(MediaType, Arc<dyn MessageConverter>), ServiceError> {
		let media_type = self.negotiator.negotiate(request);
		let converter = Arc::clone(self.converters.select_writer(payload_type, &media_type)?);
		Ok((media_type, converter))
	}

	/// Negotiates and writes `payload` into a `200 OK` response.
	pub async fn render<B>(
		&self,
		request: &Request<B>,
		payload: &Payload,
	) -> Result<Response<Bytes>, ServiceError> {
		self.render_negotiated(&NegotiationRequest::from_http(request), payload)
			.await
	}

	pub async fn render_negotiated(
		&self,
		request: &NegotiationRequest<'_>,
		payload: &Payload,
	) -> Result<Response<Bytes>, ServiceError> {
		let outcome = self.negotiator.negotiate_outcome(request);
		let written = self.converters.write(payload, &outcome.media_type).await?;
		tracing::debug!(
			content_type = %written.content_type,
			resolved_by = %outcome.resolved_by,
			len = written.body.len(),
			"rendered response"
		);

		Ok(Response::builder()
			.status(StatusCode::OK)
			.header(CONTENT_TYPE, written.content_type.to_string())
			.header(CONTENT_LENGTH, written.body.len())
			.body(written.body)?)
	}

	/// As [`render`](Self::render), with failures turned into error responses.
	pub async fn respond<B>(&self, request: &Request<B>, payload: &Payload) -> Response<Bytes> {
		match self.render(request, payload).await {
			Ok(response) => response,
			Err(e) => e.to_response(),
		}
	}

	/// Reads a request body according to its `Content-Type`, which defaults
	/// to `application/octet-stream` when absent.
	pub async fn read_body(
		&self,
		headers: &HeaderMap,
		body: Bytes,
		payload_type: PayloadType,
	) -> Result<Payload, ServiceError> {
		let media_type = content_type(headers)?;
		Ok(self.converters.read(body, &media_type, payload_type).await?)
	}

	/// Reads an object body straight into `T`. A body that does not fit `T`
	/// is malformed input.
	pub async fn read_object<T: DeserializeOwned>(
		&self,
		headers: &HeaderMap,
		body: Bytes,
	) -> Result<T, ServiceError> {
		let media_type = content_type(headers)?;
		let payload = self
			.converters
			.read(body, &media_type, PayloadType::Object)
			.await?;
		payload
			.into_object()
			.map_err(|e| ConverterError::malformed(&media_type, e.to_string()).into())
	}
}

fn content_type(headers: &HeaderMap) -> Result<MediaType, ServiceError> {
	let Some(value) = headers.get(CONTENT_TYPE) else {
		return Ok(MediaType::application_octet_stream());
	};
	let value = value
		.to_str()
		.map_err(|e| ServiceError::InvalidContentType(e.to_string()))?;
	value
		.parse()
		.map_err(|e: makas_negotiation::MediaTypeError| {
			ServiceError::InvalidContentType(e.to_string())
		})
}
