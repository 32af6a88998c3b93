use super::{AccessPolicy, RouteDescriptor};
use crate::models::Role;

/// Student Route Module
///
/// The learner-facing section of the portal, all under the `/student`
/// namespace and all requiring the 'student' role. The dashboard route is
/// the redirect target whenever a student is bounced off a route they may
/// not visit.
pub fn routes() -> Vec<RouteDescriptor> {
    const POLICY: AccessPolicy = AccessPolicy::RequiresRole(Role::Student);
    vec![
        RouteDescriptor {
            path: "/student",
            name: "StudentDashboard",
            policy: POLICY,
        },
        // Lesson material published by teachers.
        RouteDescriptor {
            path: "/student/tutorials",
            name: "StudentTutorials",
            policy: POLICY,
        },
        RouteDescriptor {
            path: "/student/practice",
            name: "StudentPractice",
            policy: POLICY,
        },
        RouteDescriptor {
            path: "/student/quizzes",
            name: "StudentQuizzes",
            policy: POLICY,
        },
        // Per-student progress tracking across tutorials and quizzes.
        RouteDescriptor {
            path: "/student/progress",
            name: "StudentProgress",
            policy: POLICY,
        },
        RouteDescriptor {
            path: "/student/announcements",
            name: "StudentAnnouncements",
            policy: POLICY,
        },
    ]
}
