use super::*;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Serializes tests in this file that touch the shared `DIFY_*` env vars.
static ENV_LOCK: Mutex<()> = Mutex::new(());

fn env_guard() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

/// # Safety
/// Callers must hold [`env_guard`].
unsafe fn clear_dify_env() {
    unsafe {
        std::env::remove_var("DIFY_API_KEY");
        std::env::remove_var("DIFY_ENDPOINT");
        std::env::remove_var("DIFY_STREAMING");
        std::env::remove_var("DIFY_CONNECT_TIMEOUT_SECS");
        std::env::remove_var("DIFY_REQUEST_TIMEOUT_SECS");
    }
}

#[test]
fn from_env_defaults() {
    let _guard = env_guard();
    unsafe {
        clear_dify_env();
        std::env::set_var("DIFY_API_KEY", "app-secret");
    }

    let cfg = DifyConfig::from_env().unwrap();
    assert_eq!(cfg.api_key, "app-secret");
    assert_eq!(cfg.endpoint, DEFAULT_DIFY_ENDPOINT);
    assert!(cfg.streaming);
    assert_eq!(cfg.timeouts, UpstreamTimeouts { request_secs: None, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS });

    unsafe { clear_dify_env() };
}

#[test]
fn from_env_parses_overrides() {
    let _guard = env_guard();
    unsafe {
        clear_dify_env();
        std::env::set_var("DIFY_API_KEY", "app-secret");
        std::env::set_var("DIFY_ENDPOINT", "https://dify.example.test/v1/chat-messages");
        std::env::set_var("DIFY_STREAMING", "off");
        std::env::set_var("DIFY_CONNECT_TIMEOUT_SECS", "3");
        std::env::set_var("DIFY_REQUEST_TIMEOUT_SECS", "90");
    }

    let cfg = DifyConfig::from_env().unwrap();
    assert_eq!(cfg.endpoint, "https://dify.example.test/v1/chat-messages");
    assert!(!cfg.streaming);
    assert_eq!(cfg.timeouts, UpstreamTimeouts { request_secs: Some(90), connect_secs: 3 });

    unsafe { clear_dify_env() };
}

#[test]
fn from_env_missing_key_errors() {
    let _guard = env_guard();
    unsafe { clear_dify_env() };

    let err = DifyConfig::from_env().unwrap_err();
    assert!(matches!(err, UpstreamError::MissingApiKey { ref var } if var == "DIFY_API_KEY"));
}

#[test]
fn from_env_blank_key_errors() {
    let _guard = env_guard();
    unsafe {
        clear_dify_env();
        std::env::set_var("DIFY_API_KEY", "   ");
    }

    assert!(DifyConfig::from_env().is_err());

    unsafe { clear_dify_env() };
}

#[test]
fn parse_bool_variants() {
    for raw in ["1", "true", "YES", " On "] {
        assert!(parse_bool("K", Some(raw), false).unwrap(), "expected true for {raw:?}");
    }
    for raw in ["0", "false", "No", "OFF"] {
        assert!(!parse_bool("K", Some(raw), true).unwrap(), "expected false for {raw:?}");
    }
}

#[test]
fn parse_bool_unset_or_empty_uses_default() {
    assert!(parse_bool("K", None, true).unwrap());
    assert!(!parse_bool("K", Some(""), false).unwrap());
}

#[test]
fn parse_bool_invalid_errors() {
    let err = parse_bool("DIFY_STREAMING", Some("maybe"), true).unwrap_err().to_string();
    assert!(err.contains("DIFY_STREAMING"));
}
