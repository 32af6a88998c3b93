//! Navigation and RBAC core for the ALS learning portal.
//!
//! The portal's views (student, teacher and admin sections) are plain UI;
//! what this crate owns is everything that decides whether a navigation may
//! happen: the static route table with per-route access policies, the
//! session and role resolvers over the external auth and document-store
//! collaborators, and the navigation guard that turns all of it into a
//! terminal decision per transition. The collaborators are injected behind
//! traits, so the whole decision surface is testable against the in-crate
//! mocks.

use std::sync::Arc;

// --- Module Structure ---

// Core navigation services and components.
pub mod auth;
pub mod config;
pub mod guard;
pub mod models;
pub mod resolver;
pub mod store;

// Module for routing segregation (Public, Student, Teacher, Admin).
pub mod routes;

// --- Public Re-exports ---

// Makes the core types easily accessible to the embedding application.
pub use auth::{AuthProvider, AuthState, MockAuthProvider, RestAuthProvider};
pub use config::AppConfig;
pub use guard::{LOGIN_PATH, NavigationGuard, Navigator};
pub use models::{Identity, NavigationDecision, Role};
pub use routes::{AccessPolicy, RouteDescriptor, RouteTable};
pub use store::{DocumentStore, MemoryDocumentStore, RestDocumentStore, StoreState};

/// create_navigator
///
/// Assembles the standard navigation stack: the portal's full route table,
/// a guard over the injected collaborators, and the navigator that
/// serializes attempts against it. The embedding application calls this once
/// at startup and routes every transition through the result.
pub fn create_navigator(auth: AuthState, store: StoreState, config: &AppConfig) -> Navigator {
    let routes = Arc::new(RouteTable::standard());
    let guard = NavigationGuard::new(auth, store, routes, config);
    Navigator::new(Arc::new(guard))
}
