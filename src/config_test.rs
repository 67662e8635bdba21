use super::*;
use std::sync::{Mutex, MutexGuard, PoisonError};

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn env_guard() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

/// # Safety
/// Callers must hold [`env_guard`].
unsafe fn clear_server_env() {
    unsafe {
        std::env::remove_var("PORT");
        std::env::remove_var("BIND_ADDR");
        std::env::remove_var("STATIC_DIR");
    }
}

#[test]
fn from_env_defaults() {
    let _guard = env_guard();
    unsafe { clear_server_env() };

    let cfg = ServerConfig::from_env().unwrap();
    assert_eq!(cfg.port, DEFAULT_PORT);
    assert_eq!(cfg.bind_addr, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
    assert_eq!(cfg.static_dir, None);
    assert_eq!(cfg.socket_addr().to_string(), "0.0.0.0:3000");
}

#[test]
fn from_env_parses_overrides() {
    let _guard = env_guard();
    unsafe {
        clear_server_env();
        std::env::set_var("PORT", "8080");
        std::env::set_var("BIND_ADDR", "127.0.0.1");
        std::env::set_var("STATIC_DIR", "/srv/chat");
    }

    let cfg = ServerConfig::from_env().unwrap();
    assert_eq!(cfg.socket_addr().to_string(), "127.0.0.1:8080");
    assert_eq!(cfg.static_dir, Some(PathBuf::from("/srv/chat")));

    unsafe { clear_server_env() };
}

#[test]
fn from_env_invalid_port_errors() {
    let _guard = env_guard();
    unsafe {
        clear_server_env();
        std::env::set_var("PORT", "not-a-port");
    }

    let err = ServerConfig::from_env().unwrap_err().to_string();
    assert!(err.contains("PORT"));

    unsafe { clear_server_env() };
}

#[test]
fn from_env_blank_static_dir_is_none() {
    let _guard = env_guard();
    unsafe {
        clear_server_env();
        std::env::set_var("STATIC_DIR", "  ");
    }

    assert_eq!(ServerConfig::from_env().unwrap().static_dir, None);

    unsafe { clear_server_env() };
}
