use lawfirm_portal::{AppConfig, config::Env};
use serial_test::serial;
use std::{env, panic, path::PathBuf};

const VARS: [&str; 7] = [
    "APP_ENV",
    "API_BASE_URL",
    "ENQUIRY_LIMIT",
    "REVALIDATE_SESSIONS",
    "PORTAL_STORAGE_PATH",
    "PORTAL_BIND_ADDR",
    "PORTAL_ALLOWED_ORIGIN",
];

// --- Setup/Teardown Utilities ---

/// Runs `test` with the given variables set (and every other portal
/// variable cleared), then restores the original environment.
fn run_with_env<T, R>(vars: &[(&str, &str)], test: T) -> R
where
    T: FnOnce() -> R + panic::UnwindSafe,
{
    let originals: Vec<(&str, Option<String>)> =
        VARS.iter().map(|&var| (var, env::var(var).ok())).collect();

    unsafe {
        for var in VARS {
            env::remove_var(var);
        }
        for (key, value) in vars {
            env::set_var(key, value);
        }
    }

    let result = panic::catch_unwind(test);

    for (key, original_value) in originals {
        unsafe {
            match original_value {
                Some(val) => env::set_var(key, val),
                None => env::remove_var(key),
            }
        }
    }

    match result {
        Ok(value) => value,
        Err(e) => panic::resume_unwind(e),
    }
}

// --- Tests ---

#[test]
#[serial]
fn test_local_defaults() {
    let config = run_with_env(&[], AppConfig::load).unwrap();

    assert_eq!(config.env, Env::Local);
    assert_eq!(config.api_base_url, "http://localhost:5000");
    assert_eq!(config.storage_path, PathBuf::from("portal-store.json"));
    assert_eq!(config.bind_addr, "127.0.0.1:3000");
    assert_eq!(config.enquiry_limit, 1000);
    assert!(!config.revalidate_sessions);
    assert_eq!(config.allowed_origin, None);
}

#[test]
#[serial]
fn test_production_requires_api_base_url() {
    let error = run_with_env(&[("APP_ENV", "production")], AppConfig::load).unwrap_err();
    assert!(error.to_string().contains("API_BASE_URL must be set in production"));
}

#[test]
#[serial]
fn test_production_revalidates_by_default() {
    let config = run_with_env(
        &[
            ("APP_ENV", "production"),
            ("API_BASE_URL", "https://api.firm.example/"),
        ],
        AppConfig::load,
    )
    .unwrap();

    assert_eq!(config.env, Env::Production);
    assert_eq!(config.api_base_url, "https://api.firm.example");
    assert!(config.revalidate_sessions);
}

#[test]
#[serial]
fn test_explicit_overrides() {
    let config = run_with_env(
        &[
            ("ENQUIRY_LIMIT", "50"),
            ("REVALIDATE_SESSIONS", "yes"),
            ("PORTAL_STORAGE_PATH", "/tmp/portal.json"),
            ("PORTAL_BIND_ADDR", "127.0.0.1:8080"),
        ],
        AppConfig::load,
    )
    .unwrap();

    assert_eq!(config.enquiry_limit, 50);
    assert!(config.revalidate_sessions);
    assert_eq!(config.storage_path, PathBuf::from("/tmp/portal.json"));
    assert_eq!(config.bind_addr, "127.0.0.1:8080");
}

#[test]
#[serial]
fn test_malformed_values_are_rejected() {
    assert!(run_with_env(&[("ENQUIRY_LIMIT", "lots")], AppConfig::load).is_err());
    assert!(run_with_env(&[("API_BASE_URL", "ftp://files")], AppConfig::load).is_err());
}

#[test]
#[serial]
fn test_allowed_origin() {
    let config = run_with_env(&[("PORTAL_ALLOWED_ORIGIN", "https://firm.example")], AppConfig::load).unwrap();
    assert_eq!(config.allowed_origin.unwrap(), "https://firm.example");

    let config = run_with_env(&[("PORTAL_ALLOWED_ORIGIN", "")], AppConfig::load).unwrap();
    assert_eq!(config.allowed_origin, None);

    let error = run_with_env(&[("PORTAL_ALLOWED_ORIGIN", "bad\norigin")], AppConfig::load).unwrap_err();
    assert!(error.to_string().contains("PORTAL_ALLOWED_ORIGIN"));
}
