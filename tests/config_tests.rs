use als_portal::{AppConfig, config::Env};
use serial_test::serial;
use std::time::Duration;
use std::{env, panic};

// --- Setup/Teardown Utilities ---

/// Utility to run a test function and restore environment variables afterward
fn run_with_env<T, R>(test: T, cleanup_vars: Vec<&'static str>) -> R
where
    T: FnOnce() -> R + panic::UnwindSafe,
{
    // Save current environment variables
    let originals: Vec<(String, Option<String>)> = cleanup_vars
        .iter()
        .map(|&var| (var.to_string(), env::var(var).ok()))
        .collect();

    // Run the test
    let result = panic::catch_unwind(test);

    // Restore original environment variables
    for (key, original_value) in originals.into_iter().rev() {
        unsafe {
            if let Some(val) = original_value {
                env::set_var(&key, val);
            } else {
                env::remove_var(&key);
            }
        }
    }

    // Re-panic if the test failed
    match result {
        Ok(value) => value,
        Err(e) => panic::resume_unwind(e),
    }
}

// --- Tests ---

#[test]
#[serial]
fn test_app_config_production_fail_fast() {
    // Production loading must panic when the backend coordinates are absent.
    let result = run_with_env(
        || {
            panic::catch_unwind(|| {
                unsafe {
                    env::set_var("APP_ENV", "production");
                    env::remove_var("API_BASE");
                    env::remove_var("API_KEY");
                }
                AppConfig::load()
            })
        },
        vec!["APP_ENV", "API_BASE", "API_KEY"],
    );

    assert!(
        result.is_err(),
        "Production config loading should panic on missing backend settings"
    );
}

#[test]
#[serial]
fn test_app_config_local_env_defaults() {
    // Local mode should not panic, and should use the dockerized-stack defaults.
    let config = run_with_env(
        || {
            unsafe {
                env::set_var("APP_ENV", "local");
                // Clear the variables under test to exercise the fallbacks.
                env::remove_var("API_BASE");
                env::remove_var("API_KEY");
                env::remove_var("USERS_COLLECTION");
                env::remove_var("RESOLVER_TIMEOUT_MS");
            }
            AppConfig::load()
        },
        vec![
            "APP_ENV",
            "API_BASE",
            "API_KEY",
            "USERS_COLLECTION",
            "RESOLVER_TIMEOUT_MS",
        ],
    );

    assert_eq!(config.env, Env::Local);
    assert_eq!(config.api_base, "http://localhost:54321");
    assert_eq!(config.api_key, "local-anon-key");
    assert_eq!(config.users_collection, "users");
    assert_eq!(config.resolver_timeout, Duration::from_secs(5));
}

#[test]
#[serial]
fn test_app_config_overrides_are_honored() {
    let config = run_with_env(
        || {
            unsafe {
                env::set_var("APP_ENV", "production");
                env::set_var("API_BASE", "https://als.example.com");
                env::set_var("API_KEY", "publishable-key");
                env::set_var("USERS_COLLECTION", "profiles");
                env::set_var("RESOLVER_TIMEOUT_MS", "250");
            }
            AppConfig::load()
        },
        vec![
            "APP_ENV",
            "API_BASE",
            "API_KEY",
            "USERS_COLLECTION",
            "RESOLVER_TIMEOUT_MS",
        ],
    );

    assert_eq!(config.env, Env::Production);
    assert_eq!(config.api_base, "https://als.example.com");
    assert_eq!(config.users_collection, "profiles");
    assert_eq!(config.resolver_timeout, Duration::from_millis(250));
}
