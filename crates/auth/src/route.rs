//! Static routing table.
//!
//! Declarations are built once and never mutated at runtime.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{Role, RoutePaths};

/// Screen a route renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Screen {
    Home,
    Login,
    SystemAdminLogin,
    SignUp,
    About,
    Contact,
    UserDashboard,
    Students,
    Faculties,
    Courses,
    Classes,
    Batches,
    Sections,
    Subjects,
    Enrollments,
    TeacherAssignments,
    Profile,
    Settings,
    AdminDashboard,
    UserManagement,
    OrganizationProfile,
    /// The 403 page.
    Forbidden,
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteKind {
    /// Requires a session. An empty role set admits any authenticated role.
    Private { allowed_roles: BTreeSet<Role> },
    /// Reachable without a session. `restricted` pages (login, signup) send
    /// authenticated users to `redirect_to` instead.
    Public { restricted: bool, redirect_to: String },
    /// Rendered without consulting the gate.
    Unguarded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDeclaration {
    pub path: String,
    pub kind: RouteKind,
    pub screen: Screen,
}

impl RouteDeclaration {
    pub fn private(
        path: impl Into<String>,
        screen: Screen,
        allowed_roles: impl IntoIterator<Item = Role>,
    ) -> Self {
        Self {
            path: path.into(),
            kind: RouteKind::Private {
                allowed_roles: allowed_roles.into_iter().collect(),
            },
            screen,
        }
    }

    pub fn public(
        path: impl Into<String>,
        screen: Screen,
        restricted: bool,
        redirect_to: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            kind: RouteKind::Public {
                restricted,
                redirect_to: redirect_to.into(),
            },
            screen,
        }
    }

    pub fn unguarded(path: impl Into<String>, screen: Screen) -> Self {
        Self {
            path: path.into(),
            kind: RouteKind::Unguarded,
            screen,
        }
    }
}

/// Strip query, fragment and trailing slash (except for the root).
pub fn normalize_path(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let path = &path[..end];
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    routes: Vec<RouteDeclaration>,
}

impl RouteTable {
    pub fn new(routes: Vec<RouteDeclaration>) -> Self {
        Self { routes }
    }

    /// The application's routes, with redirect targets taken from `paths`.
    pub fn standard(paths: &RoutePaths) -> Self {
        use Role::*;

        const ANY_ROLE: [Role; 0] = [];
        let academic = [Admin, Staff, Teacher];
        let office = [Admin, Staff];
        let dashboard = &paths.user_dashboard;

        let routes = vec![
            RouteDeclaration::public(&paths.home, Screen::Home, false, dashboard),
            RouteDeclaration::public(&paths.login, Screen::Login, true, dashboard),
            RouteDeclaration::public(
                &paths.system_admin_login,
                Screen::SystemAdminLogin,
                true,
                dashboard,
            ),
            RouteDeclaration::public(&paths.signup, Screen::SignUp, true, dashboard),
            RouteDeclaration::public("/about", Screen::About, false, dashboard),
            RouteDeclaration::public("/contact", Screen::Contact, false, dashboard),
            RouteDeclaration::private(
                dashboard,
                Screen::UserDashboard,
                [User, Staff, Admin, Teacher, Accountant],
            ),
            RouteDeclaration::private("/dashboard/students", Screen::Students, academic),
            RouteDeclaration::private("/dashboard/faculties", Screen::Faculties, academic),
            RouteDeclaration::private("/dashboard/courses", Screen::Courses, academic),
            RouteDeclaration::private("/dashboard/classes", Screen::Classes, academic),
            RouteDeclaration::private("/dashboard/batches", Screen::Batches, academic),
            RouteDeclaration::private("/dashboard/sections", Screen::Sections, academic),
            RouteDeclaration::private("/dashboard/subjects", Screen::Subjects, academic),
            RouteDeclaration::private("/dashboard/enrollments", Screen::Enrollments, office),
            RouteDeclaration::private(
                "/dashboard/teacher-assignments",
                Screen::TeacherAssignments,
                office,
            ),
            RouteDeclaration::private(&paths.profile_setup, Screen::Profile, ANY_ROLE),
            RouteDeclaration::private("/dashboard/settings", Screen::Settings, ANY_ROLE),
            RouteDeclaration::private(&paths.admin_root, Screen::AdminDashboard, [Admin]),
            RouteDeclaration::private("/admin/users", Screen::UserManagement, [Admin]),
            RouteDeclaration::private("/admin/profile", Screen::OrganizationProfile, [Admin]),
            RouteDeclaration::unguarded(&paths.unauthorized, Screen::Forbidden),
        ];

        Self::new(routes)
    }

    /// Exact match after normalization; first declaration wins.
    pub fn resolve(&self, path: &str) -> Option<&RouteDeclaration> {
        let path = normalize_path(path);
        self.routes
            .iter()
            .find(|route| normalize_path(&route.path) == path)
    }

    pub fn routes(&self) -> &[RouteDeclaration] {
        &self.routes
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::standard(&RoutePaths::default())
    }
}
