use super::{AccessPolicy, RouteDescriptor};

/// Public Route Module
///
/// The two screens a signed-out visitor is supposed to see. Both are tagged
/// guest-only rather than public: a signed-in user landing on `/` or
/// `/login` is redirected straight to their role's dashboard, so the login
/// form is never shown to someone who already has a session.
pub fn routes() -> Vec<RouteDescriptor> {
    vec![
        // The landing page. Guest-only so an authenticated user entering the
        // site root is forwarded to their dashboard immediately.
        RouteDescriptor {
            path: "/",
            name: "Home",
            policy: AccessPolicy::GuestOnly,
        },
        // The sign-in screen, including the password-reset request form.
        RouteDescriptor {
            path: "/login",
            name: "Login",
            policy: AccessPolicy::GuestOnly,
        },
    ]
}
