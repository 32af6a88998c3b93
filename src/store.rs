use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, atomic::AtomicBool, atomic::AtomicUsize, atomic::Ordering};
use thiserror::Error;
use uuid::Uuid;

use crate::{config::AppConfig, models::UserRecord};

/// StoreError
///
/// Failures of the document-store collaborator. A missing document is *not*
/// an error (it is `Ok(None)`); these variants cover the lookup itself going
/// wrong. The role resolver folds all of them into "no role", so the guard's
/// decision table never grows a per-failure-mode branch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Network-level or server-side failure while performing the read.
    #[error("document store transport failure: {0}")]
    Transport(String),
    /// The store rejected the read (missing or revoked credentials).
    #[error("document store denied the read")]
    PermissionDenied,
    /// The read did not complete within the configured bound.
    #[error("document store read timed out")]
    Timeout,
}

/// DocumentStore Contract
///
/// The abstract contract for the external document database. The guard needs
/// exactly one operation: a single point read of the per-identity record.
/// Everything else the portal's views do with the store is out of this
/// crate's scope.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetches the record stored under `id` in `collection`, or `Ok(None)`
    /// if no such document exists.
    async fn get_user_record(
        &self,
        collection: &str,
        id: Uuid,
    ) -> Result<Option<UserRecord>, StoreError>;
}

/// StoreState
///
/// The concrete type used to share the document-store collaborator across
/// the guard and the rest of the application.
pub type StoreState = Arc<dyn DocumentStore>;

// --- REST Implementation ---

/// RestDocumentStore
///
/// The concrete implementation over the backend service's data REST API
/// (`/rest/v1/{collection}?id=eq.{key}`). The service returns a JSON array
/// of matching rows; a point read on the primary key yields zero or one.
#[derive(Clone)]
pub struct RestDocumentStore {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
}

impl RestDocumentStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: config.api_base.clone(),
            api_key: config.api_key.clone(),
        }
    }
}

#[async_trait]
impl DocumentStore for RestDocumentStore {
    async fn get_user_record(
        &self,
        collection: &str,
        id: Uuid,
    ) -> Result<Option<UserRecord>, StoreError> {
        let url = format!("{}/rest/v1/{}", self.api_base, collection);
        let response = self
            .client
            .get(url)
            .header("apikey", &self.api_key)
            .query(&[("id", format!("eq.{id}")), ("limit", "1".to_string())])
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(StoreError::PermissionDenied);
        }
        if !status.is_success() {
            return Err(StoreError::Transport(format!(
                "read failed with status {status}"
            )));
        }

        let mut rows: Vec<UserRecord> = response
            .json()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        // Zero rows is the documented not-found shape for a key-filtered read.
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }
}

// --- Mock Implementation (For Tests) ---

/// MemoryDocumentStore
///
/// An in-memory mock of the document store used by the test suites. Records
/// are seeded per test; the failure switch makes every lookup fail so the
/// fail-closed paths can be exercised without a network.
#[derive(Default)]
pub struct MemoryDocumentStore {
    records: Mutex<HashMap<Uuid, UserRecord>>,
    should_fail: AtomicBool,
    /// Number of point reads performed, so tests can assert that a `None`
    /// identity never reaches the store.
    pub lookup_calls: AtomicUsize,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every lookup fails with a transport error.
    pub fn failing() -> Self {
        let store = Self::default();
        store.should_fail.store(true, Ordering::SeqCst);
        store
    }

    /// Seeds a user record, returning `self` for chained setup.
    pub fn with_record(self, record: UserRecord) -> Self {
        self.insert(record);
        self
    }

    pub fn insert(&self, record: UserRecord) {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(record.id, record);
    }

    pub fn set_failing(&self, failing: bool) {
        self.should_fail.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get_user_record(
        &self,
        _collection: &str,
        id: Uuid,
    ) -> Result<Option<UserRecord>, StoreError> {
        self.lookup_calls.fetch_add(1, Ordering::SeqCst);

        if self.should_fail.load(Ordering::SeqCst) {
            return Err(StoreError::Transport(
                "mock store failure requested".to_string(),
            ));
        }

        Ok(self
            .records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&id)
            .cloned())
    }
}
