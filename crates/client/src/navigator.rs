//! Path resolution through the route gate.

use std::sync::Arc;

use campusgate_auth::{
    Decision, Identity, Redirect, RedirectReason, RouteKind, RoutePaths, RouteTable, Screen,
    Session, evaluate,
};
use serde::Serialize;

use crate::SessionStore;

/// Redirects followed before giving up on a navigation.
pub const MAX_REDIRECTS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Render(Screen),
    /// Session not resolved; show the placeholder and navigate again later.
    Loading,
    /// No declared route matches; the gate was not consulted.
    NotFound,
    RedirectLoop,
}

/// Where a navigation ended and how it got there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Navigation {
    pub requested: String,
    pub location: String,
    pub outcome: Outcome,
    pub hops: Vec<Redirect>,
}

pub struct Navigator {
    table: RouteTable,
    paths: RoutePaths,
    store: Arc<SessionStore>,
}

impl Navigator {
    pub fn new(table: RouteTable, paths: RoutePaths, store: Arc<SessionStore>) -> Self {
        Self {
            table,
            paths,
            store,
        }
    }

    /// Navigator over the standard routes for `paths`.
    pub fn standard(paths: RoutePaths, store: Arc<SessionStore>) -> Self {
        Self::new(RouteTable::standard(&paths), paths, store)
    }

    pub fn paths(&self) -> &RoutePaths {
        &self.paths
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Navigate against the store's current session.
    pub fn navigate(&self, path: &str) -> Navigation {
        self.navigate_with(&self.store.current_session(), path)
    }

    /// Navigate against an explicit session snapshot.
    pub fn navigate_with(&self, session: &Session, path: &str) -> Navigation {
        let mut location = path.to_string();
        let mut hops = Vec::new();

        loop {
            let Some(route) = self.table.resolve(&location) else {
                return self.finish(path, location, Outcome::NotFound, hops);
            };

            let redirect = match evaluate(route, session, &location, &self.paths) {
                Decision::Loading => return self.finish(path, location, Outcome::Loading, hops),
                Decision::Render => {
                    return self.finish(path, location, Outcome::Render(route.screen), hops);
                }
                Decision::Redirect(redirect) => redirect,
            };

            if redirect.reason == RedirectReason::RoleNotAllowed {
                let allowed = match &route.kind {
                    RouteKind::Private { allowed_roles } => allowed_roles
                        .iter()
                        .map(|role| role.as_str())
                        .collect::<Vec<_>>()
                        .join(","),
                    RouteKind::Public { .. } | RouteKind::Unguarded => String::new(),
                };
                tracing::warn!(
                    path = %location,
                    role = ?session.identity.as_ref().map(|identity| identity.role),
                    allowed = %allowed,
                    "role not allowed on route"
                );
            } else {
                tracing::debug!(
                    from = %location,
                    to = %redirect.to,
                    reason = ?redirect.reason,
                    "navigation redirected"
                );
            }

            location = redirect.to.clone();
            hops.push(redirect);

            if hops.len() >= MAX_REDIRECTS {
                tracing::warn!(
                    requested = %path,
                    location = %location,
                    hops = hops.len(),
                    "redirect limit reached"
                );
                return self.finish(path, location, Outcome::RedirectLoop, hops);
            }
        }
    }

    /// Post-login destination for `identity`.
    pub fn landing_path(&self, identity: &Identity) -> &str {
        self.paths.landing_for(identity)
    }

    fn finish(
        &self,
        requested: &str,
        location: String,
        outcome: Outcome,
        hops: Vec<Redirect>,
    ) -> Navigation {
        Navigation {
            requested: requested.to_string(),
            location,
            outcome,
            hops,
        }
    }
}
