use super::*;

#[test]
fn empty_document_uses_defaults() {
    let config = ClientConfig::from_json("{}").unwrap();
    assert_eq!(config, ClientConfig::default());
    assert_eq!(config.api_base_path, "/api");
    assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
    assert_eq!(config.log_level, log::Level::Trace);
}

#[test]
fn reads_pascal_case_keys() {
    let raw = r#"{
        "ApiBaseUrl": "https://api.example.com/",
        "ApiBasePath": "v2/",
        "StorageKey": "my_session",
        "LogLevel": "warn",
        "Unrelated": 42
    }"#;
    let config = ClientConfig::from_json(raw).unwrap();
    assert_eq!(config.api_base_url.as_deref(), Some("https://api.example.com"));
    assert_eq!(config.api_base_path, "/v2");
    assert_eq!(config.storage_key, "my_session");
    assert_eq!(config.log_level, log::Level::Warn);
}

#[test]
fn blank_base_url_falls_back_to_page_origin() {
    let config = ClientConfig::from_json(r#"{"ApiBaseUrl": "   "}"#).unwrap();
    assert!(config.api_base_url.is_none());
    assert_eq!(config.resolve_api_root("https://app.example.com/"), "https://app.example.com/api");
}

#[test]
fn configured_base_url_wins_over_page_origin() {
    let config = ClientConfig::from_json(r#"{"ApiBaseUrl": "http://localhost:5001"}"#).unwrap();
    assert_eq!(config.resolve_api_root("https://app.example.com"), "http://localhost:5001/api");
}

#[test]
fn empty_base_path_resolves_to_bare_origin() {
    let config = ClientConfig::from_json(r#"{"ApiBasePath": "/"}"#).unwrap();
    assert_eq!(config.resolve_api_root("https://app.example.com"), "https://app.example.com");
}

#[test]
fn rejects_non_http_base_url() {
    let err = ClientConfig::from_json(r#"{"ApiBaseUrl": "ftp://files.example.com"}"#).unwrap_err();
    assert_eq!(err, ConfigError::InvalidBaseUrl("ftp://files.example.com".to_owned()));
}

#[test]
fn rejects_scheme_without_host() {
    let err = ClientConfig::from_json(r#"{"ApiBaseUrl": "https://"}"#).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidBaseUrl(_)));
}

#[test]
fn rejects_unknown_log_level() {
    let err = ClientConfig::from_json(r#"{"LogLevel": "loud"}"#).unwrap_err();
    assert_eq!(err, ConfigError::InvalidLogLevel("loud".to_owned()));
}

#[test]
fn rejects_malformed_document() {
    let err = ClientConfig::from_json("not json").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn base_url_is_normalized() {
    let config = ClientConfig::from_json(r#"{"ApiBaseUrl": "HTTPS://API.Example.com:443/gateway/"}"#).unwrap();
    assert_eq!(config.api_base_url.as_deref(), Some("https://api.example.com/gateway"));
    assert_eq!(config.resolve_api_root("https://app.example.com"), "https://api.example.com/gateway/api");
}

#[test]
fn rejects_relative_and_hostless_base_urls() {
    for raw in ["/api", "api.example.com", "https://:443", "mailto:ops@example.com"] {
        let err = ClientConfig::from_json(&format!(r#"{{"ApiBaseUrl": "{raw}"}}"#)).unwrap_err();
        assert_eq!(err, ConfigError::InvalidBaseUrl(raw.to_owned()), "{raw}");
    }
}
