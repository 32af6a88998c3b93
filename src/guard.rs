use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;

use crate::{
    auth::AuthState,
    config::AppConfig,
    models::{Identity, NavigationDecision, Role},
    resolver::{resolve_current_identity, resolve_role},
    routes::{RouteTable, leading_segment},
    store::StoreState,
};

/// The least-privileged destination. Every error path ends here.
pub const LOGIN_PATH: &str = "/login";

/// NavigationGuard
///
/// Intercepts every route transition and combines the route table's policy
/// with the session and role resolvers' output into a terminal
/// [`NavigationDecision`]. Constructed with injected collaborators so tests
/// substitute the in-crate mocks; holds no state of its own between calls —
/// each evaluation is a pure function of the destination and the
/// collaborators' answers at that moment.
///
/// The guard fails closed: no resolver error ever surfaces as an exception,
/// and none can produce an `Allow`. The worst a failure yields is a silent
/// detour to `/login` or to the user's own dashboard.
pub struct NavigationGuard {
    auth: AuthState,
    store: StoreState,
    routes: Arc<RouteTable>,
    users_collection: String,
    resolver_timeout: Duration,
}

impl NavigationGuard {
    pub fn new(auth: AuthState, store: StoreState, routes: Arc<RouteTable>, config: &AppConfig) -> Self {
        Self {
            auth,
            store,
            routes,
            users_collection: config.users_collection.clone(),
            resolver_timeout: config.resolver_timeout,
        }
    }

    /// evaluate
    ///
    /// Decides one navigation attempt. Evaluation order follows the decision
    /// table: match the destination, resolve the session, then apply
    /// guest-only, auth-required and role-required checks in turn. Role
    /// resolution only happens on the branches that need it.
    pub async fn evaluate(&self, destination: &str) -> NavigationDecision {
        // 1. Policy flags from the matched route chain. A destination no
        // route claims belongs to the catch-all entry.
        let Some(matched) = self.routes.match_path(destination) else {
            tracing::debug!(destination, "unmatched destination, applying catch-all redirect");
            return NavigationDecision::RedirectTo(self.routes.catch_all_target().to_string());
        };

        // 2. Session resolution. A resolver failure is logged and treated as
        // "no identity": for protected destinations that lands on the login
        // redirect below, never on an Allow with unverified state.
        let identity = match resolve_current_identity(self.auth.as_ref(), self.resolver_timeout).await
        {
            Ok(identity) => identity,
            Err(e) => {
                tracing::warn!(destination, error = %e, "session resolution failed, treating as anonymous");
                None
            }
        };

        // 3. Guest-only destinations bounce signed-in users to their own
        // dashboard. An identity without a resolvable role has no dashboard
        // to bounce to, so the session is terminated instead.
        if matched.requires_guest {
            if let Some(identity) = &identity {
                return match self.role_of(identity).await {
                    Some(role) => NavigationDecision::RedirectTo(role.home_path()),
                    None => self.sign_out_to_login(identity).await,
                };
            }
        }

        if matched.requires_auth {
            // 4. Protected destination, nobody signed in.
            let Some(identity) = &identity else {
                return NavigationDecision::RedirectTo(LOGIN_PATH.to_string());
            };

            // 5. Role check.
            if let Some(required) = matched.required_role {
                let Some(role) = self.role_of(identity).await else {
                    return self.sign_out_to_login(identity).await;
                };

                if role != required {
                    tracing::info!(
                        destination,
                        user_id = %identity.id,
                        %role,
                        required = %required,
                        "role mismatch, redirecting to own dashboard"
                    );
                    return NavigationDecision::RedirectTo(role.home_path());
                }

                // Path/role consistency: a destination whose leading segment
                // is some *other* role's namespace cannot be allowed on the
                // strength of its metadata alone.
                if let Some(namespace) = Role::from_namespace(&leading_segment(destination)) {
                    if namespace != role {
                        tracing::warn!(
                            destination,
                            user_id = %identity.id,
                            %role,
                            "path namespace disagrees with route metadata"
                        );
                        return NavigationDecision::RedirectTo(role.home_path());
                    }
                }
            }
        }

        // 6. No requirement stood in the way.
        NavigationDecision::Allow
    }

    async fn role_of(&self, identity: &Identity) -> Option<Role> {
        resolve_role(
            self.store.as_ref(),
            &self.users_collection,
            Some(identity),
            self.resolver_timeout,
        )
        .await
    }

    /// Terminates the session (best-effort; a sign-out failure is logged and
    /// does not change the decision) and routes to the login screen.
    async fn sign_out_to_login(&self, identity: &Identity) -> NavigationDecision {
        tracing::info!(user_id = %identity.id, "identity has no resolvable role, terminating session");
        if let Err(e) = self.auth.sign_out().await {
            tracing::warn!(user_id = %identity.id, error = %e, "sign-out failed, proceeding to login regardless");
        }
        NavigationDecision::SignOutAndRedirect(LOGIN_PATH.to_string())
    }
}

/// NavigationError
///
/// Failures of the navigation layer itself, as opposed to the guard's
/// collaborators. Logged by the caller, never shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    /// The decision was computed for an attempt that a newer navigation has
    /// displaced; the caller must discard it.
    #[error("navigation superseded by a newer attempt")]
    Superseded,
}

/// Navigator
///
/// Serializes navigation attempts over a shared [`NavigationGuard`]. Each
/// attempt is stamped with a generation token before the resolvers run; if a
/// newer attempt has started by the time the decision is ready, the stale
/// decision is withheld. In-flight resolver calls are not cancelled — they
/// are simply not allowed to decide a navigation they no longer own.
pub struct Navigator {
    guard: Arc<NavigationGuard>,
    generation: AtomicU64,
}

impl Navigator {
    pub fn new(guard: Arc<NavigationGuard>) -> Self {
        Self {
            guard,
            generation: AtomicU64::new(0),
        }
    }

    /// navigate
    ///
    /// Evaluates one navigation attempt, refusing to emit a decision that a
    /// newer attempt has superseded.
    pub async fn navigate(&self, destination: &str) -> Result<NavigationDecision, NavigationError> {
        let token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let decision = self.guard.evaluate(destination).await;

        if self.generation.load(Ordering::SeqCst) != token {
            tracing::debug!(destination, "discarding decision for superseded navigation");
            return Err(NavigationError::Superseded);
        }
        Ok(decision)
    }
}
