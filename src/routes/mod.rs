//! Route Module Index
//!
//! Organizes the portal's route surface into role-segregated modules, the
//! same segregation the views themselves live under. Each module contributes
//! its slice of the static table; [`RouteTable`] assembles them, appends the
//! catch-all, and answers the guard's matching queries.

use serde::Serialize;
use ts_rs::TS;

use crate::models::Role;

/// Routes accessible to anonymous visitors (landing page, login).
pub mod public;

/// Routes requiring the 'student' role.
pub mod student;

/// Routes requiring the 'teacher' role.
pub mod teacher;

/// Routes restricted exclusively to users with the 'admin' role.
pub mod admin;

/// AccessPolicy
///
/// The access tag carried by each route. The set is closed: a route is
/// either open to everyone, reserved for signed-out visitors, or reserved
/// for one specific role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(tag = "kind", content = "role", rename_all = "camelCase")]
pub enum AccessPolicy {
    /// No requirement; the guard always allows.
    Public,
    /// Only for signed-out visitors (landing and login screens). A signed-in
    /// user is bounced to their own dashboard instead.
    GuestOnly,
    /// Only for identities whose resolved role equals the given one.
    RequiresRole(Role),
}

/// RouteDescriptor
///
/// One static entry of the route table: `{ path, name, policy }`. Defined
/// once at startup, never mutated. The front end consumes the full list to
/// build its view mapping; the guard consumes it through [`RouteTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct RouteDescriptor {
    pub path: &'static str,
    pub name: &'static str,
    pub policy: AccessPolicy,
}

/// RouteMatch
///
/// The aggregated access requirements of a destination, computed over its
/// matched route chain (the route itself plus every ancestor present in the
/// table). A policy declared on any ancestor applies to the whole subtree;
/// when several `RequiresRole` tags appear in one chain the deepest wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteMatch {
    pub name: &'static str,
    pub requires_auth: bool,
    pub requires_guest: bool,
    pub required_role: Option<Role>,
}

/// RouteTable
///
/// The static, ordered route surface plus the catch-all entry redirecting
/// unmatched paths to the root.
pub struct RouteTable {
    routes: Vec<RouteDescriptor>,
    catch_all_target: &'static str,
}

impl RouteTable {
    /// standard
    ///
    /// Assembles the portal's full route surface from the role-segregated
    /// modules.
    pub fn standard() -> Self {
        let mut routes = public::routes();
        routes.extend(student::routes());
        routes.extend(teacher::routes());
        routes.extend(admin::routes());
        Self::new(routes)
    }

    pub fn new(routes: Vec<RouteDescriptor>) -> Self {
        Self {
            routes,
            catch_all_target: "/",
        }
    }

    /// The ordered entries, exposed for the front end's view wiring.
    pub fn routes(&self) -> &[RouteDescriptor] {
        &self.routes
    }

    /// Where the catch-all (`*`) entry sends unmatched paths.
    pub fn catch_all_target(&self) -> &'static str {
        self.catch_all_target
    }

    /// match_path
    ///
    /// Resolves a destination to its aggregated access requirements, or
    /// `None` when only the catch-all matches. Query strings and fragments
    /// are not part of the matched path.
    pub fn match_path(&self, destination: &str) -> Option<RouteMatch> {
        let path = normalize(destination);
        let matched = self.find(&path)?;

        let mut requires_auth = false;
        let mut requires_guest = false;
        let mut required_role = None;

        // Walk the chain from the shallowest ancestor down to the matched
        // route itself, so deeper declarations override shallower ones.
        for ancestor in ancestors(&path) {
            if let Some(route) = self.find(&ancestor) {
                apply(route.policy, &mut requires_auth, &mut requires_guest, &mut required_role);
            }
        }
        apply(matched.policy, &mut requires_auth, &mut requires_guest, &mut required_role);

        Some(RouteMatch {
            name: matched.name,
            requires_auth,
            requires_guest,
            required_role,
        })
    }

    fn find(&self, path: &str) -> Option<&RouteDescriptor> {
        self.routes.iter().find(|route| route.path == path)
    }
}

fn apply(
    policy: AccessPolicy,
    requires_auth: &mut bool,
    requires_guest: &mut bool,
    required_role: &mut Option<Role>,
) {
    match policy {
        AccessPolicy::Public => {}
        AccessPolicy::GuestOnly => *requires_guest = true,
        AccessPolicy::RequiresRole(role) => {
            *requires_auth = true;
            *required_role = Some(role);
        }
    }
}

/// Canonical form of a destination path: no query/fragment, no trailing
/// slash (except the root itself), exactly one leading slash.
fn normalize(destination: &str) -> String {
    let path = destination
        .split(['?', '#'])
        .next()
        .unwrap_or(destination);
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// Strict segment-prefix ancestors of a normalized path, shallowest first
/// (`/teacher/upload-content` → `["/teacher"]`). The root is not anyone's
/// ancestor; top-level routes stand alone.
fn ancestors(path: &str) -> Vec<String> {
    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
    (1..segments.len())
        .map(|depth| format!("/{}", segments[..depth].join("/")))
        .collect()
}

/// The first path segment of a normalized destination, used by the guard's
/// role-namespace cross-check.
pub(crate) fn leading_segment(destination: &str) -> String {
    normalize(destination)
        .trim_start_matches('/')
        .split('/')
        .next()
        .unwrap_or("")
        .to_string()
}
