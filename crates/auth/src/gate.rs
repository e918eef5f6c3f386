//! Route gating policy.
//!
//! - No IO
//! - No panics
//! - Every input yields a [`Decision`]; authorization failures are redirects,
//!   never errors.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::route::normalize_path;
use crate::{Identity, Role, RouteDeclaration, RouteKind, RoutePaths, Session};

/// Outcome of a navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Decision {
    /// Session not resolved yet; show the neutral placeholder.
    Loading,
    Render,
    Redirect(Redirect),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redirect {
    pub to: String,
    pub reason: RedirectReason,
}

/// Which rule produced a redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectReason {
    /// No session on a private route.
    Unauthenticated,
    /// Profile missing or rejected; only profile setup is reachable.
    ProfileIncomplete,
    /// Account not approved; academic and admin modules are closed.
    AwaitingApproval,
    /// Role not in the route's allowed set.
    RoleNotAllowed,
    /// Signed-in user on a login/signup page.
    AlreadyAuthenticated,
}

impl Decision {
    fn redirect(to: &str, reason: RedirectReason) -> Self {
        Decision::Redirect(Redirect {
            to: to.to_string(),
            reason,
        })
    }

    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            Decision::Redirect(redirect) => Some(&redirect.to),
            Decision::Loading | Decision::Render => None,
        }
    }
}

/// Gate any declared route.
pub fn evaluate(
    route: &RouteDeclaration,
    session: &Session,
    path: &str,
    paths: &RoutePaths,
) -> Decision {
    match &route.kind {
        RouteKind::Private { allowed_roles } => private_route(allowed_roles, session, path, paths),
        RouteKind::Public {
            restricted,
            redirect_to,
        } => public_route(*restricted, redirect_to, session, paths),
        RouteKind::Unguarded => Decision::Render,
    }
}

/// Gate a route that requires a session. First matching rule wins.
///
/// The profile rule (4) and the unapproved-module rule (5) overlap on
/// `PENDING_PROFILE` and `REJECTED`; both are kept, in this order.
pub fn private_route(
    allowed_roles: &BTreeSet<Role>,
    session: &Session,
    path: &str,
    paths: &RoutePaths,
) -> Decision {
    // 1. Still checking.
    if session.loading {
        return Decision::Loading;
    }

    // 2. Not signed in.
    let Some(identity) = &session.identity else {
        return Decision::redirect(&paths.login, RedirectReason::Unauthenticated);
    };

    // 3. System admin bypass.
    if identity.is_system_admin {
        return Decision::Render;
    }

    let path = normalize_path(path);
    let status = identity.approval_status;

    // 4. Profile gating.
    if status.needs_profile() && path != normalize_path(&paths.profile_setup) {
        return Decision::redirect(&paths.profile_setup, RedirectReason::ProfileIncomplete);
    }

    // 5. Unapproved accounts stay out of academic and admin modules.
    if status.is_unapproved() && paths.is_restricted_while_unapproved(path) {
        return Decision::redirect(&paths.user_dashboard, RedirectReason::AwaitingApproval);
    }

    // 6. Role check.
    if !role_allowed(identity, allowed_roles) {
        return Decision::redirect(&paths.unauthorized, RedirectReason::RoleNotAllowed);
    }

    Decision::Render
}

/// Gate a route reachable without a session.
pub fn public_route(
    restricted: bool,
    redirect_to: &str,
    session: &Session,
    paths: &RoutePaths,
) -> Decision {
    if session.loading {
        return Decision::Loading;
    }

    match &session.identity {
        Some(identity) if restricted => {
            let target = if identity.is_system_admin {
                paths.admin_root.as_str()
            } else {
                redirect_to
            };
            Decision::redirect(target, RedirectReason::AlreadyAuthenticated)
        }
        _ => Decision::Render,
    }
}

fn role_allowed(identity: &Identity, allowed_roles: &BTreeSet<Role>) -> bool {
    allowed_roles.is_empty() || allowed_roles.contains(&identity.role)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ApprovalStatus, RouteTable};
    use campusgate_core::Email;
    use proptest::prelude::*;

    fn identity(role: Role, status: ApprovalStatus) -> Identity {
        Identity::new(Email::parse("member@school.edu").unwrap(), role, status)
    }

    fn roles(list: &[Role]) -> BTreeSet<Role> {
        list.iter().copied().collect()
    }

    fn redirect(to: &str, reason: RedirectReason) -> Decision {
        Decision::Redirect(Redirect {
            to: to.to_string(),
            reason,
        })
    }

    // ─────────────────────────────────────────────────────────────────────
    // Scenarios
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn approved_teacher_sees_students() {
        let paths = RoutePaths::default();
        let session = Session::authenticated(identity(Role::Teacher, ApprovalStatus::Approved));
        let decision = private_route(
            &roles(&[Role::Admin, Role::Staff, Role::Teacher]),
            &session,
            "/dashboard/students",
            &paths,
        );
        assert_eq!(decision, Decision::Render);
    }

    #[test]
    fn pending_approval_user_is_sent_to_dashboard_before_role_check() {
        let paths = RoutePaths::default();
        let session = Session::authenticated(identity(Role::User, ApprovalStatus::PendingApproval));
        let decision = private_route(
            &roles(&[Role::Admin, Role::Staff, Role::Teacher]),
            &session,
            "/dashboard/students",
            &paths,
        );
        assert_eq!(
            decision,
            redirect("/dashboard", RedirectReason::AwaitingApproval)
        );
    }

    #[test]
    fn anonymous_admin_request_goes_to_login() {
        let paths = RoutePaths::default();
        let decision = private_route(
            &roles(&[Role::Admin]),
            &Session::unauthenticated(),
            "/admin",
            &paths,
        );
        assert_eq!(decision, redirect("/login", RedirectReason::Unauthenticated));
    }

    #[test]
    fn restricted_public_route_redirects_by_admin_flag() {
        let paths = RoutePaths::default();

        let sysadmin = Session::authenticated(
            identity(Role::Admin, ApprovalStatus::Approved).with_system_admin(true),
        );
        assert_eq!(
            public_route(true, "/dashboard", &sysadmin, &paths),
            redirect("/admin", RedirectReason::AlreadyAuthenticated)
        );

        let member = Session::authenticated(identity(Role::User, ApprovalStatus::Approved));
        assert_eq!(
            public_route(true, "/dashboard", &member, &paths),
            redirect("/dashboard", RedirectReason::AlreadyAuthenticated)
        );
    }

    #[test]
    fn unrestricted_public_route_renders_for_everyone() {
        let paths = RoutePaths::default();
        let member = Session::authenticated(identity(Role::User, ApprovalStatus::Approved));
        assert_eq!(public_route(false, "/dashboard", &member, &paths), Decision::Render);
        assert_eq!(
            public_route(false, "/dashboard", &Session::unauthenticated(), &paths),
            Decision::Render
        );
        assert_eq!(
            public_route(true, "/dashboard", &Session::unauthenticated(), &paths),
            Decision::Render
        );
    }

    #[test]
    fn rejected_user_can_only_reach_profile_setup() {
        let paths = RoutePaths::default();
        let session = Session::authenticated(
            identity(Role::Teacher, ApprovalStatus::Rejected).with_rejection_reason("incomplete"),
        );

        assert_eq!(
            private_route(&BTreeSet::new(), &session, "/dashboard", &paths),
            redirect("/dashboard/profile", RedirectReason::ProfileIncomplete)
        );
        assert_eq!(
            private_route(&BTreeSet::new(), &session, "/dashboard/profile", &paths),
            Decision::Render
        );
        assert_eq!(
            private_route(&BTreeSet::new(), &session, "/dashboard/profile/", &paths),
            Decision::Render
        );
    }

    #[test]
    fn pending_approval_user_reaches_unrestricted_pages() {
        let paths = RoutePaths::default();
        let session = Session::authenticated(identity(Role::User, ApprovalStatus::PendingApproval));
        assert_eq!(
            private_route(
                &roles(&[Role::User, Role::Staff, Role::Admin, Role::Teacher, Role::Accountant]),
                &session,
                "/dashboard",
                &paths
            ),
            Decision::Render
        );
        assert_eq!(
            private_route(&BTreeSet::new(), &session, "/dashboard/settings", &paths),
            Decision::Render
        );
    }

    #[test]
    fn pending_approval_admin_is_kept_out_of_admin_root() {
        let paths = RoutePaths::default();
        let session = Session::authenticated(identity(Role::Admin, ApprovalStatus::PendingApproval));
        assert_eq!(
            private_route(&roles(&[Role::Admin]), &session, "/admin/users", &paths),
            redirect("/dashboard", RedirectReason::AwaitingApproval)
        );
    }

    #[test]
    fn approved_accountant_is_forbidden_from_enrollments() {
        let paths = RoutePaths::default();
        let session = Session::authenticated(identity(Role::Accountant, ApprovalStatus::Approved));
        assert_eq!(
            private_route(
                &roles(&[Role::Admin, Role::Staff]),
                &session,
                "/dashboard/enrollments",
                &paths
            ),
            redirect("/unauthorized", RedirectReason::RoleNotAllowed)
        );
    }

    #[test]
    fn unguarded_route_renders_even_while_loading() {
        let paths = RoutePaths::default();
        let table = RouteTable::default();
        let route = table.resolve("/unauthorized").unwrap();
        assert_eq!(
            evaluate(route, &Session::loading(), "/unauthorized", &paths),
            Decision::Render
        );
    }

    #[test]
    fn custom_paths_are_honored() {
        let paths = RoutePaths {
            login: "/sign-in".to_string(),
            ..RoutePaths::default()
        };
        assert_eq!(
            private_route(&BTreeSet::new(), &Session::unauthenticated(), "/x", &paths),
            redirect("/sign-in", RedirectReason::Unauthenticated)
        );
    }

    // ─────────────────────────────────────────────────────────────────────
    // Properties
    // ─────────────────────────────────────────────────────────────────────

    fn any_role() -> impl Strategy<Value = Role> {
        prop::sample::select(Role::ALL.to_vec())
    }

    fn any_status() -> impl Strategy<Value = ApprovalStatus> {
        prop::sample::select(ApprovalStatus::ALL.to_vec())
    }

    fn any_roles() -> impl Strategy<Value = BTreeSet<Role>> {
        prop::collection::btree_set(any_role(), 0..4)
    }

    fn any_identity() -> impl Strategy<Value = Identity> {
        (any_role(), any_status(), any::<bool>())
            .prop_map(|(role, status, admin)| identity(role, status).with_system_admin(admin))
    }

    fn any_path() -> impl Strategy<Value = String> {
        let table = RouteTable::default();
        let declared: Vec<String> = table.routes().iter().map(|r| r.path.clone()).collect();
        prop_oneof![
            prop::sample::select(declared),
            "/[a-z]{1,8}(/[a-z-]{1,12})?",
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: a loading session always yields the placeholder.
        #[test]
        fn loading_session_always_shows_placeholder(
            identity in prop::option::of(any_identity()),
            allowed in any_roles(),
            restricted in any::<bool>(),
            path in any_path(),
        ) {
            let paths = RoutePaths::default();
            let session = Session { identity, loading: true };
            prop_assert_eq!(private_route(&allowed, &session, &path, &paths), Decision::Loading);
            prop_assert_eq!(public_route(restricted, "/dashboard", &session, &paths), Decision::Loading);
        }

        /// Property: no identity on a private route always goes to login.
        #[test]
        fn anonymous_private_access_goes_to_login(allowed in any_roles(), path in any_path()) {
            let paths = RoutePaths::default();
            prop_assert_eq!(
                private_route(&allowed, &Session::unauthenticated(), &path, &paths),
                redirect("/login", RedirectReason::Unauthenticated)
            );
        }

        /// Property: system admins always render private routes.
        #[test]
        fn system_admin_always_renders(
            role in any_role(),
            status in any_status(),
            allowed in any_roles(),
            path in any_path(),
        ) {
            let paths = RoutePaths::default();
            let session = Session::authenticated(identity(role, status).with_system_admin(true));
            prop_assert_eq!(private_route(&allowed, &session, &path, &paths), Decision::Render);
        }

        /// Property: without a profile, everything but profile setup redirects there.
        #[test]
        fn pending_profile_is_sent_to_profile_setup(
            role in any_role(),
            allowed in any_roles(),
            path in any_path(),
        ) {
            prop_assume!(normalize_path(&path) != "/dashboard/profile");
            let paths = RoutePaths::default();
            let session = Session::authenticated(identity(role, ApprovalStatus::PendingProfile));
            prop_assert_eq!(
                private_route(&allowed, &session, &path, &paths),
                redirect("/dashboard/profile", RedirectReason::ProfileIncomplete)
            );
        }

        /// Property: pending approval closes restricted modules and nothing else.
        #[test]
        fn pending_approval_only_blocks_restricted_modules(role in any_role(), path in any_path()) {
            let paths = RoutePaths::default();
            let session = Session::authenticated(identity(role, ApprovalStatus::PendingApproval));
            let decision = private_route(&BTreeSet::new(), &session, &path, &paths);
            if paths.is_restricted_while_unapproved(normalize_path(&path)) {
                prop_assert_eq!(decision, redirect("/dashboard", RedirectReason::AwaitingApproval));
            } else {
                prop_assert_eq!(decision, Decision::Render);
            }
        }

        /// Property: approved users outside a non-empty allowed set are forbidden.
        #[test]
        fn approved_role_outside_allowed_set_is_forbidden(
            role in any_role(),
            allowed in prop::collection::btree_set(any_role(), 1..4),
            path in any_path(),
        ) {
            prop_assume!(!allowed.contains(&role));
            let paths = RoutePaths::default();
            let session = Session::authenticated(identity(role, ApprovalStatus::Approved));
            prop_assert_eq!(
                private_route(&allowed, &session, &path, &paths),
                redirect("/unauthorized", RedirectReason::RoleNotAllowed)
            );
        }

        /// Property: approved users inside the allowed set always render.
        #[test]
        fn approved_role_inside_allowed_set_renders(
            role in any_role(),
            extra in any_roles(),
            path in any_path(),
        ) {
            let mut allowed = extra;
            allowed.insert(role);
            let paths = RoutePaths::default();
            let session = Session::authenticated(identity(role, ApprovalStatus::Approved));
            prop_assert_eq!(private_route(&allowed, &session, &path, &paths), Decision::Render);
        }
    }
}
