//! Tests for litgraph-core: messages, error taxonomy, settings loading

use litgraph_core::*;
use std::collections::HashMap;

// ===========================================================================
// Message / Role
// ===========================================================================

#[test]
fn message_constructors_tag_roles() {
    assert_eq!(Message::system("s").role, Role::System);
    assert_eq!(Message::user("u").role, Role::User);
    assert_eq!(Message::assistant("a").role, Role::Assistant);
}

#[test]
fn role_serializes_lowercase() {
    let msg = Message::user("hello");
    let json = serde_json::to_string(&msg).unwrap();
    assert_eq!(json, r#"{"role":"user","content":"hello"}"#);
    let back: Message = serde_json::from_str(&json).unwrap();
    assert_eq!(back, msg);
}

// ===========================================================================
// Error
// ===========================================================================

#[test]
fn planning_error_shows_raw_output() {
    let err = Error::planning("missing field `min_year`", "{\"keywords\": []}");
    let text = err.to_string();
    assert!(text.contains("missing field `min_year`"));
    assert!(text.contains("{\"keywords\": []}"));
}

#[test]
fn synthesis_error_shows_raw_output() {
    let err = Error::synthesis("expected value", "not json at all");
    assert!(err.to_string().contains("not json at all"));
}

#[test]
fn only_enrichment_is_non_fatal() {
    assert!(!Error::EnrichmentUnavailable("offline".into()).is_fatal());
    assert!(Error::configuration("x").is_fatal());
    assert!(Error::Retrieval { attempts: 3, message: "503".into() }.is_fatal());
    assert!(Error::RecursionLimit { limit: 25 }.is_fatal());
}

#[test]
fn state_conflict_names_field() {
    let err = Error::StateConflict { field: "plan" };
    assert_eq!(err.to_string(), "state conflict: field 'plan' is already set");
}

// ===========================================================================
// Settings
// ===========================================================================

#[test]
fn settings_defaults() {
    let s = Settings::default();
    assert_eq!(s.retry.max_attempts, 3);
    assert_eq!(s.retry.delay(), std::time::Duration::from_secs(2));
    assert_eq!(s.search.max_results, 5);
    assert_eq!(s.graph.recursion_limit, 25);
    assert!(s.classifier.research.contains(&"paper".to_string()));
    assert!(s.classifier.theory.contains(&"qué es".to_string()));
    assert!(s.llm.api_key.is_none());
}

#[test]
fn settings_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let s = Settings::load(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(s.retry.max_attempts, 3);
}

#[test]
fn settings_partial_file_keeps_other_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("litgraph.toml");
    std::fs::write(
        &path,
        "[retry]\nmax_attempts = 5\n\n[classifier]\ncoding = [\"rust\"]\n",
    )
    .unwrap();
    let s = Settings::load(&path).unwrap();
    assert_eq!(s.retry.max_attempts, 5);
    assert_eq!(s.retry.delay_ms, 2_000);
    assert_eq!(s.classifier.coding, vec!["rust".to_string()]);
    assert!(!s.classifier.research.is_empty());
}

#[test]
fn settings_bad_file_is_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "[retry\nmax_attempts = ").unwrap();
    let err = Settings::load(&path).unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));
}

#[test]
fn settings_env_overlay() {
    let env: HashMap<&str, &str> = HashMap::from([
        ("API_KEY", "sk-test"),
        ("MODEL_NAME", "gpt-4o-mini"),
        ("BASE_URL", "http://localhost:8000/v1"),
        ("MAX_SEARCH_RESULTS", "15"),
    ]);
    let mut s = Settings::default();
    s.apply_env(|k| env.get(k).map(|v| v.to_string())).unwrap();
    assert_eq!(s.require_api_key().unwrap(), "sk-test");
    assert_eq!(s.llm.model, "gpt-4o-mini");
    assert_eq!(s.llm.base_url, "http://localhost:8000/v1");
    assert_eq!(s.search.max_results, 15);
}

#[test]
fn settings_env_rejects_non_numeric_max_results() {
    let mut s = Settings::default();
    let err = s
        .apply_env(|k| (k == "MAX_SEARCH_RESULTS").then(|| "many".to_string()))
        .unwrap_err();
    assert!(err.to_string().contains("MAX_SEARCH_RESULTS"));
}

#[test]
fn settings_env_ignores_empty_max_results() {
    let mut s = Settings::default();
    let before = s.search.max_results;
    s.apply_env(|k| (k == "MAX_SEARCH_RESULTS").then(String::new)).unwrap();
    s.apply_env(|k| (k == "MAX_SEARCH_RESULTS").then(|| "  ".to_string())).unwrap();
    assert_eq!(s.search.max_results, before);
}

#[test]
fn settings_require_api_key_missing() {
    let s = Settings::default();
    assert!(matches!(s.require_api_key(), Err(Error::Configuration(_))));
}

#[test]
fn settings_toml_round_trip_omits_secret() {
    let mut s = Settings::default();
    s.llm.api_key = None;
    let text = s.to_toml().unwrap();
    assert!(text.contains("[retry]"));
    assert!(!text.contains("api_key"));
    let back: Settings = toml::from_str(&text).unwrap();
    assert_eq!(back.search.base_url, s.search.base_url);
}
