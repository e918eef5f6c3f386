//! `campusgate-client`
//!
//! **Responsibility:** the client-side session shell around the campus API.
//!
//! This crate provides:
//! - The session store (bootstrap, login, logout, refresh)
//! - A typed client for the remote auth endpoints
//! - Credential persistence for the bearer token
//! - Navigation through the route gate
//! - Auth flows (password login, OTP verification, signup, profile setup)
//! - A composition root building all of the above from a [`ClientConfig`]
//!
//! The API remains the authority for every business and authorization
//! decision; this crate only orchestrates.

pub mod api;
pub mod app;
pub mod config;
pub mod credentials;
pub mod error;
pub mod flows;
pub mod http;
pub mod navigator;
pub mod store;

pub use api::{Ack, AuthApi, AuthResponse, Credentials, OtpVerification, RoleOption, SignupRequest};
pub use app::{CampusApp, build_app, build_app_from_env, build_app_with_credentials};
pub use config::{ClientConfig, ConfigError};
pub use credentials::{CredentialError, CredentialStore, FileCredentialStore, InMemoryCredentialStore};
pub use error::{ApiError, FlowError};
pub use flows::{AuthFlows, OtpChallenge, SignedIn, SignupForm};
pub use http::HttpAuthApi;
pub use navigator::{Navigation, Navigator, Outcome};
pub use store::SessionStore;
