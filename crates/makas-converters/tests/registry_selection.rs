use bytes::Bytes;
use http::StatusCode;
use makas_converters::{
	ConverterError, ConverterRegistry, JsonConfig, Payload, PayloadType, XmlConfig,
};
use makas_negotiation::{ContentNegotiator, MediaType, NegotiationRequest};
use rstest::{fixture, rstest};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Order {
	id: String,
	item: String,
}

#[fixture]
fn registry() -> ConverterRegistry {
	ConverterRegistry::with_defaults(
		JsonConfig::default(),
		XmlConfig::builder().declaration(false).build(),
	)
}

fn order() -> Order {
	Order {
		id: "A-1".into(),
		item: "tea".into(),
	}
}

#[rstest]
#[case("/orders/1.json", MediaType::application_json(), br#"{"id":"A-1","item":"tea"}"#.as_slice())]
#[case(
	"/orders/1.xml",
	MediaType::application_xml(),
	b"<response><id>A-1</id><item>tea</item></response>".as_slice()
)]
#[tokio::test]
async fn test_negotiated_type_drives_converter(
	registry: ConverterRegistry,
	#[case] path: &str,
	#[case] expected_type: MediaType,
	#[case] expected_body: &[u8],
) {
	let negotiator = ContentNegotiator::default();
	let media_type = negotiator.negotiate(&NegotiationRequest::new().with_path(path));

	let written = registry
		.write(&Payload::object(&order()).unwrap(), &media_type)
		.await
		.unwrap();
	assert_eq!(written.content_type, expected_type);
	assert_eq!(written.body.as_ref(), expected_body);
}

#[rstest]
#[tokio::test]
async fn test_no_writer_is_not_acceptable(registry: ConverterRegistry) {
	let err = registry
		.write(&Payload::object(&order()).unwrap(), &MediaType::new("text", "csv"))
		.await
		.unwrap_err();
	assert!(matches!(
		err,
		ConverterError::NoConverterFound {
			payload_type: PayloadType::Object,
			..
		}
	));
	assert_eq!(err.status_code(), StatusCode::NOT_ACCEPTABLE);
}

#[rstest]
#[tokio::test]
async fn test_no_reader_is_unsupported_media_type(registry: ConverterRegistry) {
	let err = registry
		.read(
			Bytes::from_static(b"a,b"),
			&MediaType::new("text", "csv"),
			PayloadType::Object,
		)
		.await
		.unwrap_err();
	assert_eq!(err.status_code(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[rstest]
#[case(MediaType::application_json(), br#"{"id":"A-1","item":"tea"}"#.as_slice())]
#[case(
	"application/xml;charset=UTF-8".parse().unwrap(),
	b"<order><id>A-1</id><item>tea</item></order>".as_slice()
)]
#[tokio::test]
async fn test_read_typed_object(
	registry: ConverterRegistry,
	#[case] content_type: MediaType,
	#[case] body: &'static [u8],
) {
	let payload = registry
		.read(Bytes::from_static(body), &content_type, PayloadType::Object)
		.await
		.unwrap();
	assert_eq!(payload.into_object::<Order>().unwrap(), order());
}

#[rstest]
#[tokio::test]
async fn test_wildcard_text_gets_charset(registry: ConverterRegistry) {
	let written = registry
		.write(&Payload::from("hello"), &MediaType::all())
		.await
		.unwrap();
	assert_eq!(written.content_type.to_string(), "text/plain;charset=UTF-8");
	assert_eq!(written.body.as_ref(), b"hello");
}

#[rstest]
#[tokio::test]
async fn test_malformed_xml_body_is_bad_request(registry: ConverterRegistry) {
	let err = registry
		.read(
			Bytes::from_static(b"<order><id>1</order>"),
			&MediaType::application_xml(),
			PayloadType::Object,
		)
		.await
		.unwrap_err();
	assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
}

#[rstest]
#[tokio::test]
async fn test_form_fields_round_trip(registry: ConverterRegistry) {
	let fields = Payload::Form(vec![("q".into(), "green tea".into())]);
	let written = registry
		.write(&fields, &MediaType::application_form_urlencoded())
		.await
		.unwrap();
	let back = registry
		.read(
			written.body,
			&written.content_type,
			PayloadType::Form,
		)
		.await
		.unwrap();
	assert_eq!(back, fields);
}
