use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time;

use crate::{
    auth::{AuthError, AuthProvider},
    models::{Identity, Role},
    store::DocumentStore,
};

/// resolve_current_identity
///
/// The session resolver: subscribes to the auth provider, suspends until the
/// first authentication-state notification, then unsubscribes. One-shot by
/// construction; the subscription never outlives this call, and any second
/// notification the provider might emit lands after the listener has already
/// consumed its channel sender.
///
/// `timeout` bounds the wait. Expiry, or a provider that drops the listener
/// without notifying, is reported as an error; the guard treats either as
/// "no identity" and fails closed.
pub async fn resolve_current_identity(
    auth: &dyn AuthProvider,
    timeout: Duration,
) -> Result<Option<Identity>, AuthError> {
    let (tx, rx) = oneshot::channel();
    let mut tx = Some(tx);

    let subscription = auth.subscribe(Box::new(move |notification| {
        // Only the first notification matters; later ones find the sender
        // already taken.
        if let Some(tx) = tx.take() {
            let _ = tx.send(notification);
        }
    }));

    let outcome = time::timeout(timeout, rx).await;
    subscription.unsubscribe();

    match outcome {
        Ok(Ok(notification)) => notification,
        // The provider dropped our listener without ever invoking it.
        Ok(Err(_recv_error)) => Err(AuthError::SubscriptionClosed),
        Err(_elapsed) => Err(AuthError::Timeout),
    }
}

/// resolve_role
///
/// The role resolver: one point lookup of the identity's record in the
/// document store, reduced to `Option<Role>`.
///
/// Every non-success shape collapses to `None` with a diagnostic log — a
/// missing document, a failed lookup, a timeout and an unknown role string
/// all get identical downstream handling, which keeps the guard's decision
/// table small and uniformly fail-closed.
pub async fn resolve_role(
    store: &dyn DocumentStore,
    collection: &str,
    identity: Option<&Identity>,
    timeout: Duration,
) -> Option<Role> {
    // No identity, no lookup.
    let identity = identity?;

    let lookup = store.get_user_record(collection, identity.id);
    match time::timeout(timeout, lookup).await {
        Ok(Ok(Some(record))) => match record.role.parse::<Role>() {
            Ok(role) => Some(role),
            Err(unknown) => {
                tracing::warn!(user_id = %identity.id, %unknown, "stored role is not in the closed enumeration");
                None
            }
        },
        Ok(Ok(None)) => {
            tracing::debug!(user_id = %identity.id, "no role document for identity");
            None
        }
        Ok(Err(e)) => {
            tracing::warn!(user_id = %identity.id, error = %e, "role lookup failed");
            None
        }
        Err(_elapsed) => {
            tracing::warn!(user_id = %identity.id, "role lookup timed out");
            None
        }
    }
}
