use std::env;
use std::time::Duration;

/// AppConfig
///
/// Holds the crate's entire configuration state. Immutable once loaded and
/// cheap to clone, so it can be handed to each collaborator (auth provider,
/// document store, guard) at construction time without shared mutation.
#[derive(Clone)]
pub struct AppConfig {
    // Base URL of the backend-as-a-service project (auth + data REST APIs).
    pub api_base: String,
    // Publishable API key sent with every request to the service.
    pub api_key: String,
    // Document-store collection holding the per-identity role records.
    pub users_collection: String,
    // Upper bound imposed on each resolver call. Expiry is treated as a
    // resolver failure and the guard fails closed.
    pub resolver_timeout: Duration,
    // Runtime environment marker.
    pub env: Env,
}

/// Env
///
/// Defines the runtime context, switching between development conveniences
/// (default local endpoints, lenient secrets) and fail-fast production
/// loading.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// default
    ///
    /// Provides a safe, non-panicking AppConfig instance primarily used for
    /// test setup, without requiring any environment variables.
    fn default() -> Self {
        Self {
            api_base: "http://localhost:54321".to_string(),
            api_key: "local-anon-key".to_string(),
            users_collection: "users".to_string(),
            resolver_timeout: Duration::from_secs(5),
            env: Env::Local,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// The canonical function for initializing configuration at startup.
    /// Reads all parameters from environment variables (after loading any
    /// `.env` file) and implements the fail-fast principle.
    ///
    /// # Panics
    /// Panics if a critical environment variable required for the current
    /// runtime environment (especially Production) is not set. This prevents
    /// the portal from starting against an unknown backend.
    pub fn load() -> Self {
        dotenv::dotenv().ok();

        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let users_collection =
            env::var("USERS_COLLECTION").unwrap_or_else(|_| "users".to_string());

        let resolver_timeout = env::var("RESOLVER_TIMEOUT_MS")
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or_else(|| Duration::from_secs(5));

        match env {
            Env::Local => Self {
                env: Env::Local,
                // Local development runs against the dockerized service
                // stack on its default port; overrides are still honored.
                api_base: env::var("API_BASE")
                    .unwrap_or_else(|_| "http://localhost:54321".to_string()),
                api_key: env::var("API_KEY").unwrap_or_else(|_| "local-anon-key".to_string()),
                users_collection,
                resolver_timeout,
            },
            Env::Production => Self {
                env: Env::Production,
                // Production demands an explicit project URL and key.
                api_base: env::var("API_BASE").expect("FATAL: API_BASE required in production"),
                api_key: env::var("API_KEY").expect("FATAL: API_KEY required in production"),
                users_collection,
                resolver_timeout,
            },
        }
    }
}
