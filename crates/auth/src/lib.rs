//! `campusgate-auth`: pure session model and route-gating policy.
//!
//! This crate is intentionally decoupled from HTTP and storage: it decides,
//! it never fetches.

pub mod approval;
pub mod gate;
pub mod identity;
pub mod paths;
pub mod roles;
pub mod route;
pub mod session;

pub use approval::ApprovalStatus;
pub use gate::{Decision, Redirect, RedirectReason, evaluate, private_route, public_route};
pub use identity::Identity;
pub use paths::RoutePaths;
pub use roles::Role;
pub use route::{RouteDeclaration, RouteKind, RouteTable, Screen};
pub use session::Session;
