//! `reqwest`-backed implementation of [`AuthApi`].

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use campusgate_auth::Identity;

use crate::api::{
    Ack, AuthApi, AuthResponse, Credentials, OtpVerification, RoleOption, SignupRequest, endpoints,
};
use crate::{ApiError, ClientConfig, CredentialStore};

/// Cookie the server uses to hand out its CSRF token.
pub const CSRF_COOKIE: &str = "csrftoken";
/// Header the token is echoed back in on unsafe requests.
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// HTTP client for the campus API.
///
/// Attaches the persisted credential as a bearer token, keeps server cookies,
/// echoes the CSRF cookie on POST, and drops the credential whenever the
/// server answers 401.
pub struct HttpAuthApi {
    client: reqwest::Client,
    cookies: Arc<Jar>,
    base_url: String,
    credentials: Arc<dyn CredentialStore>,
}

impl HttpAuthApi {
    pub fn new(
        config: &ClientConfig,
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let cookies = Arc::new(Jar::default());
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .cookie_provider(cookies.clone())
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            client,
            cookies,
            base_url: config.api_base_url.clone(),
            credentials,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Current value of the CSRF cookie for `url`, if the server set one.
    fn csrf_token(&self, url: &str) -> Option<String> {
        let url = Url::parse(url).ok()?;
        let header = self.cookies.cookies(&url)?;
        cookie_value(header.to_str().ok()?, CSRF_COOKIE).map(str::to_string)
    }

    fn post(&self, path: &str) -> RequestBuilder {
        let url = self.url(path);
        let req = self.client.post(&url);
        match self.csrf_token(&url) {
            Some(token) => req.header(CSRF_HEADER, token),
            None => req,
        }
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match self.credentials.load() {
            Ok(Some(token)) => req.bearer_auth(token),
            Ok(None) => req,
            Err(err) => {
                tracing::warn!(error = %err, "failed to read stored credential; sending request without it");
                req
            }
        }
    }

    /// Send and return the raw body of a 2xx response.
    async fn send(&self, req: RequestBuilder) -> Result<String, ApiError> {
        let resp = self
            .authorize(req)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if status == StatusCode::UNAUTHORIZED {
            tracing::debug!("API answered 401; dropping stored credential");
            if let Err(err) = self.credentials.clear() {
                tracing::warn!(error = %err, "failed to clear stored credential after 401");
            }
        }

        if !status.is_success() {
            return Err(ApiError::from_response(status.as_u16(), &body));
        }

        Ok(body)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let body = self.send(self.client.get(self.url(path))).await?;
        decode(&body)
    }

    async fn post_json<B, T>(&self, path: &str, payload: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let body = self.send(self.post(path).json(payload)).await?;
        decode(&body)
    }

    async fn post_ack<B>(&self, path: &str, payload: &B) -> Result<Ack, ApiError>
    where
        B: Serialize + ?Sized + Sync,
    {
        let body = self.send(self.post(path).json(payload)).await?;
        Ok(Ack::from_body(&body))
    }
}

/// Value of `name` in a `Cookie` header (`a=1; b=2`).
fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

/// Empty bodies decode as JSON `null`.
fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let body = if body.trim().is_empty() { "null" } else { body };
    serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum RolesPayload {
    List(Vec<RoleOption>),
    Wrapped { data: Vec<RoleOption> },
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn current_user(&self) -> Result<Identity, ApiError> {
        self.get_json(endpoints::CURRENT_USER).await
    }

    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError> {
        self.post_json(endpoints::LOGIN, credentials).await
    }

    async fn verify_login_otp(&self, request: &OtpVerification) -> Result<AuthResponse, ApiError> {
        self.post_json(endpoints::LOGIN_VERIFY_OTP, request).await
    }

    async fn system_admin_login(&self, credentials: &Credentials) -> Result<Ack, ApiError> {
        self.post_ack(endpoints::SYSTEM_LOGIN, credentials).await
    }

    async fn system_admin_verify_otp(
        &self,
        request: &OtpVerification,
    ) -> Result<AuthResponse, ApiError> {
        self.post_json(endpoints::SYSTEM_LOGIN_VERIFY, request).await
    }

    async fn signup(&self, request: &SignupRequest) -> Result<Ack, ApiError> {
        self.post_ack(endpoints::SIGNUP, request).await
    }

    async fn verify_signup_otp(
        &self,
        request: &OtpVerification,
    ) -> Result<AuthResponse, ApiError> {
        self.post_json(endpoints::SIGNUP_VERIFY, request).await
    }

    async fn signup_roles(&self) -> Result<Vec<RoleOption>, ApiError> {
        let payload: RolesPayload = self.get_json(endpoints::ROLES).await?;
        Ok(match payload {
            RolesPayload::List(roles) | RolesPayload::Wrapped { data: roles } => roles,
        })
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.post_ack(endpoints::LOGOUT, &Value::Object(Default::default()))
            .await
            .map(|_| ())
    }

    async fn setup_profile(&self, profile: &Value) -> Result<Ack, ApiError> {
        self.post_ack(endpoints::PROFILE_SETUP, profile).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryCredentialStore;

    fn api(base: &str) -> HttpAuthApi {
        let config = ClientConfig::new(base).unwrap();
        HttpAuthApi::new(&config, Arc::new(InMemoryCredentialStore::new())).unwrap()
    }

    #[test]
    fn url_joins_paths() {
        let api = api("https://api.school.edu/v1/");
        assert_eq!(api.base_url(), "https://api.school.edu/v1");
        assert_eq!(api.url("/users/me/"), "https://api.school.edu/v1/users/me/");
        assert_eq!(api.url("auth/roles/"), "https://api.school.edu/v1/auth/roles/");
    }

    #[test]
    fn decode_handles_empty_and_invalid_bodies() {
        let empty: Option<Identity> = decode("  ").unwrap();
        assert_eq!(empty, None);

        let bad = decode::<Identity>("{\"email\":1}");
        assert!(matches!(bad, Err(ApiError::Decode(_))));
    }

    #[test]
    fn cookie_value_finds_named_cookie() {
        assert_eq!(cookie_value("sessionid=s1; csrftoken=abc", CSRF_COOKIE), Some("abc"));
        assert_eq!(cookie_value("csrftoken=xyz", CSRF_COOKIE), Some("xyz"));
        assert_eq!(cookie_value("sessionid=s1", CSRF_COOKIE), None);
        assert_eq!(cookie_value("csrftoken=", CSRF_COOKIE), None);
    }

    #[test]
    fn post_echoes_csrf_cookie() {
        let api = api("http://127.0.0.1:8000/api");
        let url = Url::parse("http://127.0.0.1:8000/api/").unwrap();
        api.cookies.add_cookie_str("csrftoken=tok-1; Path=/", &url);

        let req = api.post("/auth/logout/").build().unwrap();
        assert_eq!(req.headers()[CSRF_HEADER], "tok-1");
    }

    #[test]
    fn post_without_csrf_cookie_sends_no_header() {
        let api = api("http://127.0.0.1:8000/api");
        let req = api.post("/auth/logout/").build().unwrap();
        assert!(req.headers().get(CSRF_HEADER).is_none());
    }

    #[test]
    fn roles_payload_accepts_both_shapes() {
        let list: RolesPayload =
            serde_json::from_str(r#"[{"value":"TEACHER","label":"Teacher"}]"#).unwrap();
        let wrapped: RolesPayload =
            serde_json::from_str(r#"{"data":[{"value":"STAFF","label":"Staff"}]}"#).unwrap();
        assert!(matches!(list, RolesPayload::List(ref r) if r.len() == 1));
        assert!(matches!(wrapped, RolesPayload::Wrapped { ref data } if data.len() == 1));
    }
}
