//! Well-known navigation targets.

use serde::{Deserialize, Serialize};

use crate::{Identity, Role};

/// Paths the gate redirects to, plus the prefixes closed to unapproved users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutePaths {
    pub home: String,
    pub login: String,
    pub system_admin_login: String,
    pub signup: String,
    pub user_dashboard: String,
    pub profile_setup: String,
    pub admin_root: String,
    pub unauthorized: String,

    /// Matched with `starts_with`, so `/admin` also covers `/admin/users`.
    pub restricted_while_unapproved: Vec<String>,
}

impl RoutePaths {
    pub fn is_restricted_while_unapproved(&self, path: &str) -> bool {
        self.restricted_while_unapproved
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// Where a freshly signed-in account lands.
    pub fn landing_for(&self, identity: &Identity) -> &str {
        match identity.role {
            Role::Admin => &self.admin_root,
            _ => &self.user_dashboard,
        }
    }
}

impl Default for RoutePaths {
    fn default() -> Self {
        let restricted = [
            "/dashboard/faculties",
            "/dashboard/courses",
            "/dashboard/classes",
            "/dashboard/batches",
            "/dashboard/sections",
            "/dashboard/subjects",
            "/dashboard/students",
            "/dashboard/teachers",
            "/dashboard/enrollments",
            "/dashboard/teacher-assignments",
            "/admin",
        ];

        Self {
            home: "/".to_string(),
            login: "/login".to_string(),
            system_admin_login: "/system-admin/login".to_string(),
            signup: "/signup".to_string(),
            user_dashboard: "/dashboard".to_string(),
            profile_setup: "/dashboard/profile".to_string(),
            admin_root: "/admin".to_string(),
            unauthorized: "/unauthorized".to_string(),
            restricted_while_unapproved: restricted.iter().map(|p| p.to_string()).collect(),
        }
    }
}
