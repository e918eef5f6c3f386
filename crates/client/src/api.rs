//! Contract of the remote auth API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use campusgate_auth::{Identity, Role};

use crate::ApiError;

/// Endpoint paths, relative to the configured base URL.
pub mod endpoints {
    pub const CURRENT_USER: &str = "/users/me/";
    pub const LOGIN: &str = "/auth/login/";
    pub const LOGIN_VERIFY_OTP: &str = "/auth/login/verify-otp/";
    pub const SYSTEM_LOGIN: &str = "/auth/system/login/";
    pub const SYSTEM_LOGIN_VERIFY: &str = "/auth/system/login/verify/";
    pub const SIGNUP: &str = "/auth/signup/";
    pub const SIGNUP_VERIFY: &str = "/auth/signup/verify/";
    pub const ROLES: &str = "/auth/roles/";
    pub const LOGOUT: &str = "/auth/logout/";
    pub const PROFILE_SETUP: &str = "/people/profile/setup/";
}

/// `email` is sent as the user typed it (trimmed); servers may match it
/// case-sensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OtpVerification {
    pub email: String,
    pub otp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// A role offered on the signup form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleOption {
    pub value: Role,
    pub label: String,
}

/// Body of a successful authentication call.
///
/// Some endpoints wrap the payload in `data`; [`AuthResponse::identity`] and
/// [`AuthResponse::token`] look in both places.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    user: Option<Identity>,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    data: Option<AuthPayload>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
struct AuthPayload {
    #[serde(default)]
    user: Option<Identity>,
    #[serde(default)]
    token: Option<String>,
}

impl AuthResponse {
    pub fn new(user: Option<Identity>, token: Option<String>) -> Self {
        Self {
            user,
            token,
            message: None,
            data: None,
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.data
            .as_ref()
            .and_then(|data| data.user.as_ref())
            .or(self.user.as_ref())
    }

    /// Opaque bearer credential, when the server issues one instead of a cookie.
    pub fn token(&self) -> Option<&str> {
        self.token
            .as_deref()
            .or_else(|| self.data.as_ref().and_then(|data| data.token.as_deref()))
            .filter(|token| !token.is_empty())
    }
}

/// Acknowledgement carrying an optional server message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ack {
    pub message: Option<String>,
}

impl Ack {
    pub fn from_body(body: &str) -> Self {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string));
        Self { message }
    }
}

/// Remote auth operations consumed by the session store and the flows.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// `GET /users/me/`.
    async fn current_user(&self) -> Result<Identity, ApiError>;

    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError>;

    async fn verify_login_otp(&self, request: &OtpVerification) -> Result<AuthResponse, ApiError>;

    /// Step one of the system-admin login; the server e-mails an OTP.
    async fn system_admin_login(&self, credentials: &Credentials) -> Result<Ack, ApiError>;

    async fn system_admin_verify_otp(
        &self,
        request: &OtpVerification,
    ) -> Result<AuthResponse, ApiError>;

    async fn signup(&self, request: &SignupRequest) -> Result<Ack, ApiError>;

    async fn verify_signup_otp(&self, request: &OtpVerification)
    -> Result<AuthResponse, ApiError>;

    async fn signup_roles(&self) -> Result<Vec<RoleOption>, ApiError>;

    async fn logout(&self) -> Result<(), ApiError>;

    /// Submit profile details; the payload is passed through unchanged.
    async fn setup_profile(&self, profile: &Value) -> Result<Ack, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use campusgate_auth::ApprovalStatus;
    use serde_json::json;

    fn user_json() -> Value {
        json!({
            "email": "new@school.edu",
            "role": "STAFF",
            "approval_status": "PENDING_PROFILE",
            "is_system_admin": false
        })
    }

    #[test]
    fn identity_found_at_top_level_or_in_data() {
        let top: AuthResponse = serde_json::from_value(json!({ "user": user_json() })).unwrap();
        let nested: AuthResponse =
            serde_json::from_value(json!({ "data": { "user": user_json() } })).unwrap();

        for response in [top, nested] {
            let identity = response.identity().unwrap();
            assert_eq!(identity.role, Role::Staff);
            assert_eq!(identity.approval_status, ApprovalStatus::PendingProfile);
        }
    }

    #[test]
    fn empty_token_is_ignored() {
        let response: AuthResponse =
            serde_json::from_value(json!({ "user": user_json(), "token": "" })).unwrap();
        assert_eq!(response.token(), None);

        let response: AuthResponse =
            serde_json::from_value(json!({ "data": { "token": "abc" } })).unwrap();
        assert_eq!(response.token(), Some("abc"));
    }

    #[test]
    fn ack_reads_message_when_present() {
        assert_eq!(
            Ack::from_body(r#"{"message":"OTP sent"}"#).message.as_deref(),
            Some("OTP sent")
        );
        assert_eq!(Ack::from_body("").message, None);
        assert_eq!(Ack::from_body("[1,2]").message, None);
    }

    #[test]
    fn requests_serialize_in_wire_format() {
        let request = SignupRequest {
            email: "New@School.edu".to_string(),
            password: "pw".to_string(),
            role: Role::Teacher,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "email": "New@School.edu", "password": "pw", "role": "TEACHER" })
        );
    }
}
