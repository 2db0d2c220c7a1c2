use std::collections::HashMap;

use super::*;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect::<HashMap<_, _>>();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn new_derives_ws_base_from_api_base() {
    let cfg = ChatConfig::new("https://pharmacy.example/api/", None).unwrap();
    assert_eq!(cfg.api_base, "https://pharmacy.example/api");
    assert_eq!(cfg.ws_base, "wss://pharmacy.example/api");
    assert_eq!(cfg.ask_url(), "wss://pharmacy.example/api/rag/ws/ask");
    assert_eq!(cfg.auth_me_url(), "https://pharmacy.example/api/auth/me");
    assert_eq!(cfg.placeholder, DEFAULT_PLACEHOLDER);
    assert_eq!(cfg.access_token, None);
}

#[test]
fn new_keeps_explicit_ws_base() {
    let cfg = ChatConfig::new("http://127.0.0.1:8000", Some("ws://127.0.0.1:9000/")).unwrap();
    assert_eq!(cfg.ws_base, "ws://127.0.0.1:9000");
    assert_eq!(cfg.ask_url(), "ws://127.0.0.1:9000/rag/ws/ask");
}

#[test]
fn new_accepts_http_scheme_for_ws_base() {
    let cfg = ChatConfig::new("http://a.test", Some("http://b.test")).unwrap();
    assert_eq!(cfg.ws_base, "ws://b.test");
}

#[test]
fn new_rejects_unknown_schemes() {
    assert_eq!(
        ChatConfig::new("ftp://a.test", None),
        Err(ConfigError::InvalidBaseUrl("ftp://a.test".to_owned()))
    );
    assert!(matches!(
        ChatConfig::new("http://a.test", Some("tcp://b.test")),
        Err(ConfigError::InvalidBaseUrl(_))
    ));
}

#[test]
fn cookie_header_only_with_token() {
    let cfg = ChatConfig::new("http://a.test", None).unwrap();
    assert_eq!(cfg.cookie_header(), None);

    let cfg = cfg.with_access_token("tok-1");
    assert_eq!(cfg.cookie_header().as_deref(), Some("access_token=tok-1"));

    let cfg = cfg.with_access_token("");
    assert_eq!(cfg.cookie_header(), None);
}

#[test]
fn blank_placeholder_keeps_default() {
    let cfg = ChatConfig::new("http://a.test", None).unwrap().with_placeholder("  ");
    assert_eq!(cfg.placeholder, DEFAULT_PLACEHOLDER);

    let cfg = cfg.with_placeholder("Thinking");
    assert_eq!(cfg.placeholder, "Thinking");
}

#[test]
fn from_lookup_requires_api_base() {
    assert_eq!(
        ChatConfig::from_lookup(lookup(&[])),
        Err(ConfigError::Missing { var: "MEDTRACK_API_BASE" })
    );
    assert_eq!(
        ChatConfig::from_lookup(lookup(&[("MEDTRACK_API_BASE", "  ")])),
        Err(ConfigError::Missing { var: "MEDTRACK_API_BASE" })
    );
}

#[test]
fn from_lookup_reads_all_fields() {
    let cfg = ChatConfig::from_lookup(lookup(&[
        ("MEDTRACK_API_BASE", "https://rx.test/api"),
        ("MEDTRACK_WS_BASE", "wss://ws.rx.test"),
        ("MEDTRACK_ACCESS_TOKEN", "secret"),
        ("MEDTRACK_PLACEHOLDER", "Thinking"),
    ]))
    .unwrap();

    assert_eq!(cfg.api_base, "https://rx.test/api");
    assert_eq!(cfg.ws_base, "wss://ws.rx.test");
    assert_eq!(cfg.access_token.as_deref(), Some("secret"));
    assert_eq!(cfg.placeholder, "Thinking");
}
