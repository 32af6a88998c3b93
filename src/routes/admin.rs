use super::{AccessPolicy, RouteDescriptor};
use crate::models::Role;

/// Admin Route Module
///
/// The administrative section under the `/admin` namespace, all requiring
/// the 'admin' role. These are the screens where user roles themselves are
/// assigned, so the guard's strictest policy applies throughout.
pub fn routes() -> Vec<RouteDescriptor> {
    const POLICY: AccessPolicy = AccessPolicy::RequiresRole(Role::Admin);
    vec![
        RouteDescriptor {
            path: "/admin",
            name: "AdminDashboard",
            policy: POLICY,
        },
        // Account and role management; the writes that this crate's role
        // resolver later reads back happen here.
        RouteDescriptor {
            path: "/admin/user-management",
            name: "UserManagement",
            policy: POLICY,
        },
        // Review surface over teacher-published content.
        RouteDescriptor {
            path: "/admin/content-oversight",
            name: "ContentOversight",
            policy: POLICY,
        },
        RouteDescriptor {
            path: "/admin/system-maintenance",
            name: "SystemMaintenance",
            policy: POLICY,
        },
    ]
}
