//! XML marshalling converter
//!
//! Marshals object payloads to XML and back using quick-xml. The mapping
//! between the value tree and elements is:
//!
//! - object keys become child elements, in key order;
//! - keys starting with the attribute prefix (`@id`) become attributes;
//! - the text key (`#text`) becomes the element's text next to attributes;
//! - arrays repeat the element name once per item;
//! - `null` becomes an empty element, scalars become text.
//!
//! The document element is the configured root (`response`); a top-level
//! array is written as repeated item elements (`item`) inside it.

use async_trait::async_trait;
use bytes::Bytes;
use makas_negotiation::MediaType;
use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::attributes::Attributes;
use quick_xml::events::{BytesDecl, BytesEnd, BytesRef, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::converter::{MessageConverter, unsupported};
use crate::error::{ConverterError, ConverterResult};
use crate::payload::{Payload, PayloadType};

/// XML marshaller configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct XmlConfig {
	/// Document element name (default: "response")
	pub root_element: String,
	/// Element used for items of a top-level array (default: "item")
	pub item_element: String,
	/// Attribute prefix (default: "@")
	pub attribute_prefix: String,
	/// Text content key (default: "#text")
	pub text_key: String,
	/// Emit `<?xml version="1.0" encoding="UTF-8"?>`
	pub declaration: bool,
	/// Indent output by two spaces
	pub pretty_print: bool,
	/// Parse numeric text back into numbers when reading
	pub parse_numbers: bool,
	/// Parse `true`/`false` text back into booleans when reading
	pub parse_booleans: bool,
}

impl Default for XmlConfig {
	fn default() -> Self {
		Self {
			root_element: "response".to_string(),
			item_element: "item".to_string(),
			attribute_prefix: "@".to_string(),
			text_key: "#text".to_string(),
			declaration: true,
			pretty_print: false,
			parse_numbers: false,
			parse_booleans: false,
		}
	}
}

impl XmlConfig {
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a builder for fluent configuration
	///
	/// # Examples
	///
	/// ```
	/// use makas_converters::xml::XmlConfig;
	///
	/// let config = XmlConfig::builder()
	///     .root_element("orders")
	///     .declaration(false)
	///     .parse_numbers(true)
	///     .build();
	///
	/// assert_eq!(config.root_element, "orders");
	/// assert_eq!(config.item_element, "item");
	/// assert!(!config.declaration);
	/// assert!(config.parse_numbers);
	/// ```
	pub fn builder() -> XmlConfigBuilder {
		XmlConfigBuilder::default()
	}

	/// Root and item element names must be XML names.
	pub fn validate(&self) -> ConverterResult<()> {
		check_name(&self.root_element)?;
		check_name(&self.item_element)
	}
}

/// Builder for XmlConfig
#[derive(Debug, Default)]
pub struct XmlConfigBuilder {
	root_element: Option<String>,
	item_element: Option<String>,
	attribute_prefix: Option<String>,
	text_key: Option<String>,
	declaration: Option<bool>,
	pretty_print: Option<bool>,
	parse_numbers: Option<bool>,
	parse_booleans: Option<bool>,
}

impl XmlConfigBuilder {
	pub fn root_element(mut self, name: impl Into<String>) -> Self {
		self.root_element = Some(name.into());
		self
	}

	pub fn item_element(mut self, name: impl Into<String>) -> Self {
		self.item_element = Some(name.into());
		self
	}

	pub fn attribute_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.attribute_prefix = Some(prefix.into());
		self
	}

	pub fn text_key(mut self, key: impl Into<String>) -> Self {
		self.text_key = Some(key.into());
		self
	}

	pub fn declaration(mut self, declaration: bool) -> Self {
		self.declaration = Some(declaration);
		self
	}

	pub fn pretty_print(mut self, pretty: bool) -> Self {
		self.pretty_print = Some(pretty);
		self
	}

	pub fn parse_numbers(mut self, parse: bool) -> Self {
		self.parse_numbers = Some(parse);
		self
	}

	pub fn parse_booleans(mut self, parse: bool) -> Self {
		self.parse_booleans = Some(parse);
		self
	}

	pub fn build(self) -> XmlConfig {
		let default = XmlConfig::default();
		XmlConfig {
			root_element: self.root_element.unwrap_or(default.root_element),
			item_element: self.item_element.unwrap_or(default.item_element),
			attribute_prefix: self.attribute_prefix.unwrap_or(default.attribute_prefix),
			text_key: self.text_key.unwrap_or(default.text_key),
			declaration: self.declaration.unwrap_or(default.declaration),
			pretty_print: self.pretty_print.unwrap_or(default.pretty_print),
			parse_numbers: self.parse_numbers.unwrap_or(default.parse_numbers),
			parse_booleans: self.parse_booleans.unwrap_or(default.parse_booleans),
		}
	}
}

/// Object payloads as `application/xml` and `text/xml`.
#[derive(Debug, Clone, Default)]
pub struct XmlConverter {
	config: XmlConfig,
}

/// An element still open while reading.
struct Frame {
	name: String,
	map: Map<String, Value>,
	text: String,
}

impl XmlConverter {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_config(config: XmlConfig) -> Self {
		Self { config }
	}

	pub fn config(&self) -> &XmlConfig {
		&self.config
	}

	/// Serializes a value tree into an XML document
	///
	/// # Examples
	///
	/// ```
	/// use makas_converters::xml::{XmlConfig, XmlConverter};
	/// use serde_json::json;
	///
	/// let converter = XmlConverter::with_config(XmlConfig::builder().declaration(false).build());
	/// let xml = converter
	///     .marshal(&json!({"@id": 7, "item": ["tea", "milk"], "note": null}))
	///     .unwrap();
	/// assert_eq!(
	///     String::from_utf8(xml).unwrap(),
	///     r#"<response id="7"><item>tea</item><item>milk</item><note/></response>"#
	/// );
	/// ```
	pub fn marshal(&self, value: &Value) -> ConverterResult<Vec<u8>> {
		let mut writer = if self.config.pretty_print {
			Writer::new_with_indent(Vec::new(), b' ', 2)
		} else {
			Writer::new(Vec::new())
		};

		if self.config.declaration {
			emit(
				&mut writer,
				Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
			)?;
		}

		let root = self.config.root_element.as_str();
		match value {
			Value::Array(items) => {
				check_name(root)?;
				if items.is_empty() {
					emit(&mut writer, Event::Empty(BytesStart::new(root)))?;
				} else {
					emit(&mut writer, Event::Start(BytesStart::new(root)))?;
					for item in items {
						self.write_element(&mut writer, &self.config.item_element, item)?;
					}
					emit(&mut writer, Event::End(BytesEnd::new(root)))?;
				}
			}
			other => self.write_element(&mut writer, root, other)?,
		}

		Ok(writer.into_inner())
	}

	fn write_element(
		&self,
		writer: &mut Writer<Vec<u8>>,
		name: &str,
		value: &Value,
	) -> ConverterResult<()> {
		check_name(name)?;
		match value {
			Value::Null => emit(writer, Event::Empty(BytesStart::new(name))),
			Value::Array(items) => {
				for item in items {
					self.write_element(writer, name, item)?;
				}
				Ok(())
			}
			Value::Object(map) => {
				let mut start = BytesStart::new(name);
				let mut text = None;
				let mut children = Vec::new();
				for (key, child) in map {
					match self.attribute_name(key) {
						Some(attribute) => {
							check_name(attribute)?;
							start.push_attribute((attribute, scalar_text(child)?.as_str()));
						}
						None if *key == self.config.text_key => text = Some(scalar_text(child)?),
						None => children.push((key, child)),
					}
				}

				if text.is_none() && children.is_empty() {
					return emit(writer, Event::Empty(start));
				}
				emit(writer, Event::Start(start))?;
				if let Some(text) = text {
					emit(writer, Event::Text(BytesText::new(&text)))?;
				}
				for (key, child) in children {
					self.write_element(writer, key, child)?;
				}
				emit(writer, Event::End(BytesEnd::new(name)))
			}
			scalar => {
				let text = scalar_text(scalar)?;
				emit(writer, Event::Start(BytesStart::new(name)))?;
				emit(writer, Event::Text(BytesText::new(&text)))?;
				emit(writer, Event::End(BytesEnd::new(name)))
			}
		}
	}

	fn attribute_name<'k>(&self, key: &'k str) -> Option<&'k str> {
		let prefix = self.config.attribute_prefix.as_str();
		if prefix.is_empty() {
			return None;
		}
		key.strip_prefix(prefix)
	}

	/// Parses an XML document into a value tree, without the root element
	///
	/// # Examples
	///
	/// ```
	/// use makas_converters::xml::XmlConverter;
	/// use serde_json::json;
	///
	/// let converter = XmlConverter::new();
	/// let value = converter
	///     .unmarshal(b"<order id=\"7\"><item>tea</item><item>milk</item></order>")
	///     .unwrap();
	/// assert_eq!(value, json!({"@id": "7", "item": ["tea", "milk"]}));
	/// ```
	pub fn unmarshal(&self, body: &[u8]) -> Result<Value, String> {
		let mut reader = Reader::from_reader(body);
		let mut stack: Vec<Frame> = Vec::new();

		loop {
			match reader.read_event() {
				Ok(Event::Start(e)) => {
					let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
					let mut map = Map::new();
					self.process_attributes(e.attributes(), &mut map)?;
					stack.push(Frame {
						name,
						map,
						text: String::new(),
					});
				}

				Ok(Event::End(_)) => {
					let frame = stack
						.pop()
						.ok_or_else(|| "unbalanced end tag".to_string())?;
					let name = frame.name.clone();
					let value = self.finish(frame);
					match stack.last_mut() {
						Some(parent) => add_to_parent(&mut parent.map, &name, value),
						None => return Ok(self.unwrap_root(value)),
					}
				}

				Ok(Event::Empty(e)) => {
					let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
					let mut map = Map::new();
					self.process_attributes(e.attributes(), &mut map)?;
					let value = if map.is_empty() {
						Value::Null
					} else {
						Value::Object(map)
					};
					match stack.last_mut() {
						Some(parent) => add_to_parent(&mut parent.map, &name, value),
						None => return Ok(self.unwrap_root(value)),
					}
				}

				Ok(Event::Text(e)) => {
					let text = e
						.xml_content()
						.map_err(|e| format!("XML decode error: {}", e))?;
					if let Some(frame) = stack.last_mut() {
						frame.text.push_str(&text);
					}
				}

				Ok(Event::CData(e)) => {
					let text = String::from_utf8_lossy(e.into_inner().as_ref()).into_owned();
					if let Some(frame) = stack.last_mut() {
						frame.text.push_str(&text);
					}
				}

				Ok(Event::GeneralRef(e)) => {
					let text = resolve_reference(&e)?;
					if let Some(frame) = stack.last_mut() {
						frame.text.push_str(&text);
					}
				}

				Ok(Event::Eof) => break,

				Ok(_) => {}

				Err(e) => return Err(format!("XML parse error: {}", e)),
			}
		}

		Err("document has no complete root element".to_string())
	}

	/// Turns a closed element into its value.
	fn finish(&self, frame: Frame) -> Value {
		let text = frame.text.trim();
		if frame.map.is_empty() {
			return self.parse_value(text);
		}
		let mut map = frame.map;
		if !text.is_empty() {
			map.insert(self.config.text_key.clone(), self.parse_value(text));
		}
		Value::Object(map)
	}

	/// A document whose root only holds item elements was a top-level array.
	fn unwrap_root(&self, value: Value) -> Value {
		if let Value::Object(map) = &value
			&& map.len() == 1
			&& let Some(Value::Array(items)) = map.get(&self.config.item_element)
		{
			return Value::Array(items.clone());
		}
		value
	}

	fn process_attributes(
		&self,
		attributes: Attributes,
		obj: &mut Map<String, Value>,
	) -> Result<(), String> {
		for attr in attributes {
			let attr = attr.map_err(|e| format!("XML attribute error: {}", e))?;

			let key = format!(
				"{}{}",
				self.config.attribute_prefix,
				String::from_utf8_lossy(attr.key.as_ref())
			);

			let raw = String::from_utf8_lossy(&attr.value);
			let value = unescape(&raw).map_err(|e| format!("XML attribute error: {}", e))?;

			obj.insert(key, self.parse_value(&value));
		}
		Ok(())
	}

	/// Parse string value to appropriate JSON type
	fn parse_value(&self, s: &str) -> Value {
		if self.config.parse_numbers {
			if let Ok(i) = s.parse::<i64>() {
				return json!(i);
			}
			if let Ok(f) = s.parse::<f64>()
				&& f.is_finite()
			{
				return json!(f);
			}
		}

		if self.config.parse_booleans {
			match s.to_lowercase().as_str() {
				"true" => return json!(true),
				"false" => return json!(false),
				_ => {}
			}
		}

		json!(s)
	}
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> ConverterResult<()> {
	writer
		.write_event(event)
		.map_err(|e| ConverterError::Serialization(e.to_string()))
}

fn scalar_text(value: &Value) -> ConverterResult<String> {
	match value {
		Value::Null => Ok(String::new()),
		Value::Bool(b) => Ok(b.to_string()),
		Value::Number(n) => Ok(n.to_string()),
		Value::String(s) => Ok(s.clone()),
		Value::Array(_) | Value::Object(_) => Err(ConverterError::Serialization(
			"attributes and text content must be scalar values".to_string(),
		)),
	}
}

/// Element and attribute names must be XML names.
fn check_name(name: &str) -> ConverterResult<()> {
	let mut chars = name.chars();
	let valid = match chars.next() {
		Some(first) if first.is_alphabetic() || first == '_' || first == ':' => chars
			.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':')),
		_ => false,
	};
	if valid && !name.to_ascii_lowercase().starts_with("xml") {
		Ok(())
	} else {
		Err(ConverterError::Serialization(format!(
			"'{}' is not a valid XML name",
			name
		)))
	}
}

fn resolve_reference(reference: &BytesRef<'_>) -> Result<String, String> {
	if let Some(ch) = reference
		.resolve_char_ref()
		.map_err(|e| format!("XML reference error: {}", e))?
	{
		return Ok(ch.to_string());
	}
	let name = reference
		.decode()
		.map_err(|e| format!("XML decode error: {}", e))?;
	resolve_predefined_entity(&name)
		.map(str::to_string)
		.ok_or_else(|| format!("unknown entity &{};", name))
}

/// Add value to parent object
fn add_to_parent(parent: &mut Map<String, Value>, name: &str, value: Value) {
	if let Some(existing) = parent.get_mut(name) {
		// Convert to array if not already
		match existing {
			Value::Array(arr) => {
				arr.push(value);
			}
			_ => {
				let old_value = existing.take();
				*existing = json!([old_value, value]);
			}
		}
	} else {
		parent.insert(name.to_string(), value);
	}
}

#[async_trait]
impl MessageConverter for XmlConverter {
	fn name(&self) -> &'static str {
		"xml marshalling"
	}

	fn payload_type(&self) -> PayloadType {
		PayloadType::Object
	}

	fn supported_media_types(&self) -> Vec<MediaType> {
		vec![MediaType::application_xml(), MediaType::text_xml()]
	}

	async fn write(&self, payload: &Payload, _media_type: &MediaType) -> ConverterResult<Bytes> {
		match payload {
			Payload::Object(value) => self.marshal(value).map(Bytes::from),
			other => Err(unsupported(self.name(), other)),
		}
	}

	async fn read(&self, body: Bytes, media_type: &MediaType) -> ConverterResult<Payload> {
		self.unmarshal(&body)
			.map(Payload::Object)
			.map_err(|message| ConverterError::malformed(media_type, message))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};

	#[fixture]
	fn compact() -> XmlConverter {
		XmlConverter::with_config(XmlConfig::builder().declaration(false).build())
	}

	fn marshal_str(converter: &XmlConverter, value: Value) -> String {
		String::from_utf8(converter.marshal(&value).unwrap()).unwrap()
	}

	#[rstest]
	fn test_marshal_scalars_and_escaping(compact: XmlConverter) {
		let xml = marshal_str(
			&compact,
			json!({"name": "Fish & Chips", "price": 9.5, "vegan": false, "tag": ""}),
		);
		assert_eq!(
			xml,
			"<response><name>Fish &amp; Chips</name><price>9.5</price>\
			 <tag></tag><vegan>false</vegan></response>"
		);
	}

	#[rstest]
	fn test_marshal_top_level_array(compact: XmlConverter) {
		let xml = marshal_str(&compact, json!([{"id": "1"}, {"id": "2"}]));
		assert_eq!(
			xml,
			"<response><item><id>1</id></item><item><id>2</id></item></response>"
		);
		assert_eq!(marshal_str(&compact, json!([])), "<response/>");
	}

	#[rstest]
	fn test_marshal_text_next_to_attributes(compact: XmlConverter) {
		let xml = marshal_str(&compact, json!({"price": {"@currency": "EUR", "#text": "4.20"}}));
		assert_eq!(
			xml,
			"<response><price currency=\"EUR\">4.20</price></response>"
		);
	}

	#[rstest]
	fn test_declaration_by_default() {
		let xml = String::from_utf8(XmlConverter::new().marshal(&json!({"a": "b"})).unwrap()).unwrap();
		assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
		assert!(xml.ends_with("<response><a>b</a></response>"));
	}

	#[rstest]
	fn test_pretty_print_indents() {
		let converter = XmlConverter::with_config(
			XmlConfig::builder()
				.declaration(false)
				.pretty_print(true)
				.build(),
		);
		let xml = marshal_str(&converter, json!({"a": {"b": "c"}}));
		assert!(xml.contains("\n  <a>"));
		assert!(xml.contains("\n    <b>c</b>"));
	}

	#[rstest]
	#[case(json!({"first name": "Ada"}))]
	#[case(json!({"1st": "Ada"}))]
	#[case(json!({"xmlns": "x"}))]
	#[case(json!({"a": {"@b": {"nested": true}}}))]
	fn test_marshal_rejects_unrepresentable(compact: XmlConverter, #[case] value: Value) {
		let err = compact.marshal(&value).unwrap_err();
		assert!(matches!(err, ConverterError::Serialization(_)));
		assert!(!err.is_client_error());
	}

	#[rstest]
	#[case("1abc", "item")]
	#[case("xmlfoo", "item")]
	#[case("", "item")]
	#[case("response", "an item")]
	fn test_config_rejects_bad_element_names(#[case] root: &str, #[case] item: &str) {
		let config = XmlConfig::builder().root_element(root).item_element(item).build();
		assert!(matches!(config.validate(), Err(ConverterError::Serialization(_))));
	}

	#[rstest]
	fn test_default_config_is_valid() {
		assert!(XmlConfig::default().validate().is_ok());
	}

	#[rstest]
	fn test_unmarshal_entities_and_cdata(compact: XmlConverter) {
		let value = compact
			.unmarshal(b"<r><a>Fish &amp; Chips &#233;</a><b><![CDATA[<raw>]]></b><c/></r>")
			.unwrap();
		assert_eq!(value, json!({"a": "Fish & Chips \u{e9}", "b": "<raw>", "c": null}));
	}

	#[rstest]
	fn test_unmarshal_unwraps_item_arrays(compact: XmlConverter) {
		let value = compact
			.unmarshal(b"<response><item>a</item><item>b</item></response>")
			.unwrap();
		assert_eq!(value, json!(["a", "b"]));
	}

	#[rstest]
	fn test_unmarshal_parses_scalars_when_configured() {
		let converter = XmlConverter::with_config(
			XmlConfig::builder()
				.parse_numbers(true)
				.parse_booleans(true)
				.build(),
		);
		let value = converter
			.unmarshal(b"<r><n>42</n><f>1.5</f><t>TRUE</t><s>abc</s></r>")
			.unwrap();
		assert_eq!(value, json!({"n": 42, "f": 1.5, "t": true, "s": "abc"}));
	}

	#[rstest]
	#[case(b"".as_slice())]
	#[case(b"<a><b></a>".as_slice())]
	#[case(b"<a>".as_slice())]
	#[case(b"<a>&bogus;</a>".as_slice())]
	fn test_unmarshal_errors(compact: XmlConverter, #[case] body: &[u8]) {
		assert!(compact.unmarshal(body).is_err());
	}

	#[rstest]
	#[tokio::test]
	async fn test_round_trip_through_converter(compact: XmlConverter) {
		let value = json!({
			"@id": "A-1",
			"customer": {"name": "Ada", "email": "ada@example.com"},
			"line": [{"sku": "tea"}, {"sku": "milk"}],
		});
		let body = compact
			.write(&Payload::Object(value.clone()), &MediaType::application_xml())
			.await
			.unwrap();
		let back = compact.read(body, &MediaType::application_xml()).await.unwrap();
		assert_eq!(back, Payload::Object(value));
	}

	#[rstest]
	#[tokio::test]
	async fn test_read_malformed_is_client_error(compact: XmlConverter) {
		let err = compact
			.read(Bytes::from_static(b"<order>"), &MediaType::text_xml())
			.await
			.unwrap_err();
		assert_eq!(err.status_code(), http::StatusCode::BAD_REQUEST);
	}
}
