use std::io::Write;

use makas::{LogFormat, MediaType, WebConfig};
use rstest::rstest;
use tempfile::NamedTempFile;

fn write_config(suffix: &str, contents: &str) -> NamedTempFile {
	let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
	file.write_all(contents.as_bytes()).unwrap();
	file.flush().unwrap();
	file
}

#[rstest]
fn test_from_toml_file() {
	let file = write_config(
		".toml",
		r#"
		[negotiation]
		default_content_type = "application/json"
		ignore_accept_header = true

		[logging]
		format = "json"
		"#,
	);

	let config = WebConfig::from_file(file.path()).unwrap();
	assert_eq!(
		config.negotiation.default_content_type,
		MediaType::application_json()
	);
	assert!(config.negotiation.ignore_accept_header);
	assert_eq!(config.logging.format, LogFormat::Json);

	let service = config.build_service().unwrap();
	assert_eq!(
		service.negotiator().default_media_type(),
		&MediaType::application_json()
	);
}

#[rstest]
fn test_from_json_file() {
	let file = write_config(".json", r#"{"xml": {"root_element": "orders"}}"#);
	let config = WebConfig::from_file(file.path()).unwrap();
	assert_eq!(config.xml.root_element, "orders");
}

#[rstest]
#[case(".toml", "[negotiation]\ndefault_content_type = \"*/*\"")]
#[case(".toml", "[negotiation\n")]
#[case(".yaml", "negotiation: {}")]
fn test_invalid_file_reports_path(#[case] suffix: &str, #[case] contents: &str) {
	let file = write_config(suffix, contents);
	let err = WebConfig::from_file(file.path()).unwrap_err();
	let message = format!("{:#}", err);
	assert!(message.contains(&file.path().display().to_string()), "{message}");
}

#[rstest]
fn test_missing_file() {
	let err = WebConfig::from_file("/nonexistent/makas.toml").unwrap_err();
	assert!(err.to_string().contains("failed to read /nonexistent/makas.toml"));
}
