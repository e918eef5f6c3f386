//! `campusgate-core`: value primitives shared by the session and client layers.
//!
//! This crate contains **pure** types (no IO, no transport concerns).

pub mod email;
pub mod error;
pub mod value_object;

pub use email::Email;
pub use error::{DomainError, DomainResult};
pub use value_object::ValueObject;
