//! User-facing auth flows.
//!
//! Each flow validates what it can locally, calls the API, updates the
//! session store, and returns either the next step or a [`FlowError`] ready
//! to show inline on the form.

use std::sync::Arc;

use campusgate_auth::{Identity, Role, RoutePaths};
use campusgate_core::{DomainError, DomainResult, Email};
use serde_json::Value;

use crate::api::{Credentials, OtpVerification, SignupRequest};
use crate::{ApiError, AuthApi, AuthResponse, FlowError, RoleOption, SessionStore};

const LOGIN_FAILED: &str = "Invalid email or password";
const SYSTEM_LOGIN_FAILED: &str = "Invalid credentials or unauthorized access";
const SYSTEM_OTP_SENT: &str = "Security OTP sent to your registered email.";
const OTP_INVALID: &str = "Invalid or expired security code";
const SIGNUP_FAILED: &str = "Signup failed. Please try again.";
const SIGNUP_OTP_FAILED: &str = "OTP verification failed.";
const SIGNUP_OTP_SENT: &str = "Verification code sent to your email.";
const PROFILE_FAILED: &str = "Failed to update profile. Please try again.";
const PASSWORD_MISMATCH: &str = "Passwords do not match.";

/// An OTP has been sent to `email`; the next step is verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpChallenge {
    pub email: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub role: Role,
}

impl SignupForm {
    /// Checks that need no server round-trip.
    pub fn validate(&self) -> DomainResult<SignupRequest> {
        if self.password != self.confirm_password {
            return Err(DomainError::invariant(PASSWORD_MISMATCH));
        }
        if self.password.is_empty() {
            return Err(DomainError::validation("password must not be empty"));
        }

        Ok(SignupRequest {
            email: checked_email(&self.email)?,
            password: self.password.clone(),
            role: self.role,
        })
    }
}

/// Result of a completed sign-in: who, and where to go next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedIn {
    pub identity: Option<Identity>,
    pub landing: String,
}

pub struct AuthFlows {
    api: Arc<dyn AuthApi>,
    store: Arc<SessionStore>,
    paths: RoutePaths,
}

impl AuthFlows {
    pub fn new(api: Arc<dyn AuthApi>, store: Arc<SessionStore>, paths: RoutePaths) -> Self {
        Self { api, store, paths }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<SignedIn, FlowError> {
        let credentials = credentials(email, password)?;
        let response = self
            .api
            .login(&credentials)
            .await
            .map_err(|err| self.fail(err, LOGIN_FAILED))?;
        self.sign_in(response, LOGIN_FAILED)
    }

    pub async fn verify_login_otp(&self, email: &str, otp: &str) -> Result<SignedIn, FlowError> {
        let request = otp_request(email, otp)?;
        let response = self
            .api
            .verify_login_otp(&request)
            .await
            .map_err(|err| self.fail(err, OTP_INVALID))?;
        self.sign_in(response, OTP_INVALID)
    }

    /// Step one of the system-admin login.
    pub async fn system_admin_login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<OtpChallenge, FlowError> {
        let credentials = credentials(email, password)?;
        let ack = self
            .api
            .system_admin_login(&credentials)
            .await
            .map_err(|err| self.fail(err, SYSTEM_LOGIN_FAILED))?;

        tracing::info!(email = %credentials.email, "system admin OTP requested");
        Ok(OtpChallenge {
            email: credentials.email,
            message: ack.message.unwrap_or_else(|| SYSTEM_OTP_SENT.to_string()),
        })
    }

    pub async fn verify_system_admin_otp(
        &self,
        challenge: &OtpChallenge,
        otp: &str,
    ) -> Result<SignedIn, FlowError> {
        let request = OtpVerification {
            email: challenge.email.clone(),
            otp: otp.trim().to_string(),
        };
        let response = self
            .api
            .system_admin_verify_otp(&request)
            .await
            .map_err(|err| self.fail(err, OTP_INVALID))?;
        self.sign_in(response, OTP_INVALID)
    }

    pub async fn signup(&self, form: &SignupForm) -> Result<OtpChallenge, FlowError> {
        let request = form.validate()?;
        let ack = self
            .api
            .signup(&request)
            .await
            .map_err(|err| self.fail(err, SIGNUP_FAILED))?;

        tracing::info!(email = %request.email, role = %request.role, "signup registered");
        Ok(OtpChallenge {
            email: request.email,
            message: ack.message.unwrap_or_else(|| SIGNUP_OTP_SENT.to_string()),
        })
    }

    /// Confirm the signup OTP. New accounts always land on profile setup.
    pub async fn verify_signup_otp(
        &self,
        challenge: &OtpChallenge,
        otp: &str,
    ) -> Result<SignedIn, FlowError> {
        let request = OtpVerification {
            email: challenge.email.clone(),
            otp: otp.trim().to_string(),
        };
        let response = self
            .api
            .verify_signup_otp(&request)
            .await
            .map_err(|err| self.fail(err, SIGNUP_OTP_FAILED))?;

        self.store_token(&response);
        let identity = response.identity().cloned();
        if let Some(identity) = &identity {
            self.store.login(identity.clone());
        }

        Ok(SignedIn {
            identity,
            landing: self.paths.profile_setup.clone(),
        })
    }

    pub async fn signup_roles(&self) -> Result<Vec<RoleOption>, FlowError> {
        self.api
            .signup_roles()
            .await
            .map_err(|err| self.fail(err, SIGNUP_FAILED))
    }

    /// Post profile details, then pick up the server's new approval status.
    pub async fn submit_profile(&self, profile: &Value) -> Result<SignedIn, FlowError> {
        self.api
            .setup_profile(profile)
            .await
            .map_err(|err| self.fail(err, PROFILE_FAILED))?;

        let identity = self.store.refresh().await;
        Ok(SignedIn {
            identity,
            landing: self.paths.user_dashboard.clone(),
        })
    }

    pub async fn logout(&self) {
        self.store.logout().await;
    }

    /// Persist the credential and session from a successful sign-in.
    fn sign_in(&self, response: AuthResponse, fallback: &str) -> Result<SignedIn, FlowError> {
        let Some(identity) = response.identity().cloned() else {
            return Err(self.fail(
                ApiError::Decode("response carried no user".to_string()),
                fallback,
            ));
        };

        self.store_token(&response);
        self.store.login(identity.clone());

        Ok(SignedIn {
            landing: self.paths.landing_for(&identity).to_string(),
            identity: Some(identity),
        })
    }

    fn store_token(&self, response: &AuthResponse) {
        if let Some(token) = response.token() {
            if let Err(err) = self.store.credentials().save(token) {
                tracing::warn!(error = %err, "failed to persist credential");
            }
        }
    }

    fn fail(&self, err: ApiError, fallback: &str) -> FlowError {
        if err.is_unauthorized() {
            self.store.expire();
        }
        tracing::debug!(error = %err, "auth flow failed");
        FlowError::from_api(&err, fallback)
    }
}

/// Validate the address but keep it as typed, minus surrounding whitespace.
fn checked_email(raw: &str) -> DomainResult<String> {
    Email::parse(raw)?;
    Ok(raw.trim().to_string())
}

fn credentials(email: &str, password: &str) -> Result<Credentials, FlowError> {
    Ok(Credentials {
        email: checked_email(email)?,
        password: password.to_string(),
    })
}

fn otp_request(email: &str, otp: &str) -> Result<OtpVerification, FlowError> {
    Ok(OtpVerification {
        email: checked_email(email)?,
        otp: otp.trim().to_string(),
    })
}
