use als_portal::{
    RouteTable,
    models::Role,
    routes::{AccessPolicy, RouteDescriptor},
};

#[test]
fn standard_table_carries_the_full_portal_surface() {
    let table = RouteTable::standard();

    // 2 public + 6 student + 5 teacher + 4 admin views.
    assert_eq!(table.routes().len(), 17);

    let find = |name: &str| {
        table
            .routes()
            .iter()
            .find(|route| route.name == name)
            .unwrap_or_else(|| panic!("missing route {name}"))
    };

    assert_eq!(find("Home").path, "/");
    assert_eq!(find("Login").policy, AccessPolicy::GuestOnly);
    assert_eq!(
        find("StudentTutorials").policy,
        AccessPolicy::RequiresRole(Role::Student)
    );
    assert_eq!(find("UploadContent").path, "/teacher/upload-content");
    assert_eq!(
        find("SystemMaintenance").policy,
        AccessPolicy::RequiresRole(Role::Admin)
    );
}

#[test]
fn every_role_route_lives_in_its_own_namespace() {
    // The namespace convention the guard's cross-check relies on must hold
    // for the shipped table itself.
    for route in RouteTable::standard().routes() {
        if let AccessPolicy::RequiresRole(role) = route.policy {
            let leading = route.path.trim_start_matches('/').split('/').next().unwrap();
            assert_eq!(leading, role.as_str(), "route {}", route.path);
        }
    }
}

#[test]
fn exact_match_resolves_requirements() {
    let table = RouteTable::standard();

    let matched = table.match_path("/teacher/create-exercises").unwrap();
    assert!(matched.requires_auth);
    assert!(!matched.requires_guest);
    assert_eq!(matched.required_role, Some(Role::Teacher));
    assert_eq!(matched.name, "CreateExercises");

    let landing = table.match_path("/").unwrap();
    assert!(landing.requires_guest);
    assert!(!landing.requires_auth);
    assert_eq!(landing.required_role, None);
}

#[test]
fn policy_is_inherited_from_the_ancestor_chain() {
    // A child without a policy of its own still carries the ancestor's
    // requirement.
    let table = RouteTable::new(vec![
        RouteDescriptor {
            path: "/teacher",
            name: "TeacherDashboard",
            policy: AccessPolicy::RequiresRole(Role::Teacher),
        },
        RouteDescriptor {
            path: "/teacher/archive",
            name: "Archive",
            policy: AccessPolicy::Public,
        },
    ]);

    let matched = table.match_path("/teacher/archive").unwrap();
    assert!(matched.requires_auth);
    assert_eq!(matched.required_role, Some(Role::Teacher));
}

#[test]
fn deepest_role_declaration_wins() {
    let table = RouteTable::new(vec![
        RouteDescriptor {
            path: "/teacher",
            name: "TeacherDashboard",
            policy: AccessPolicy::RequiresRole(Role::Teacher),
        },
        RouteDescriptor {
            path: "/teacher/audit",
            name: "Audit",
            policy: AccessPolicy::RequiresRole(Role::Admin),
        },
    ]);

    let matched = table.match_path("/teacher/audit").unwrap();
    assert_eq!(matched.required_role, Some(Role::Admin));
}

#[test]
fn unmatched_paths_fall_through_to_the_catch_all() {
    let table = RouteTable::standard();

    assert!(table.match_path("/no-such-page").is_none());
    assert!(table.match_path("/student/no-such-view").is_none());
    assert_eq!(table.catch_all_target(), "/");
}

#[test]
fn destination_forms_are_normalized_before_matching() {
    let table = RouteTable::standard();

    assert!(table.match_path("/teacher/").is_some());
    assert!(table.match_path("/login?next=%2Fstudent").is_some());
    assert!(table.match_path("/admin#maintenance").is_some());
    assert!(table.match_path("student").is_some());
}
