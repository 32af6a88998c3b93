use super::{AccessPolicy, RouteDescriptor};
use crate::models::Role;

/// Teacher Route Module
///
/// The instructor-facing section under the `/teacher` namespace, all
/// requiring the 'teacher' role: class management, content authoring and
/// announcement publishing.
pub fn routes() -> Vec<RouteDescriptor> {
    const POLICY: AccessPolicy = AccessPolicy::RequiresRole(Role::Teacher);
    vec![
        RouteDescriptor {
            path: "/teacher",
            name: "TeacherDashboard",
            policy: POLICY,
        },
        // Roster view: enrollment, grouping and per-student overview.
        RouteDescriptor {
            path: "/teacher/manage-students",
            name: "ManageStudents",
            policy: POLICY,
        },
        // Upload screen for tutorial/lesson media. The upload mechanics
        // themselves live entirely in the view layer.
        RouteDescriptor {
            path: "/teacher/upload-content",
            name: "UploadContent",
            policy: POLICY,
        },
        RouteDescriptor {
            path: "/teacher/create-exercises",
            name: "CreateExercises",
            policy: POLICY,
        },
        RouteDescriptor {
            path: "/teacher/announcements",
            name: "TeacherAnnouncements",
            policy: POLICY,
        },
    ]
}
