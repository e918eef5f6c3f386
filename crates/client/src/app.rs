//! Composition root: wires configuration, credential storage, the HTTP API,
//! the session store, the navigator and the flows into one client.

use std::sync::Arc;

use anyhow::Context;

use crate::{
    ApiError, AuthFlows, ClientConfig, CredentialStore, FileCredentialStore, HttpAuthApi,
    Navigator, SessionStore,
};

pub struct CampusApp {
    config: ClientConfig,
    credentials: Arc<dyn CredentialStore>,
    api: Arc<HttpAuthApi>,
    store: Arc<SessionStore>,
    navigator: Navigator,
    flows: AuthFlows,
}

impl CampusApp {
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    pub fn api(&self) -> &Arc<HttpAuthApi> {
        &self.api
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn flows(&self) -> &AuthFlows {
        &self.flows
    }
}

/// Build from `CAMPUSGATE_*` environment variables.
pub fn build_app_from_env() -> anyhow::Result<CampusApp> {
    let config = ClientConfig::from_env().context("invalid client configuration")?;
    build_app(config)
}

/// Build with the credential persisted under the OS data directory, in a
/// file named after `config.auth_token_key`.
pub fn build_app(config: ClientConfig) -> anyhow::Result<CampusApp> {
    let credentials = FileCredentialStore::in_data_dir(&config.auth_token_key)?;
    tracing::debug!(path = ?credentials.path(), "credential store ready");
    build_app_with_credentials(config, Arc::new(credentials))
        .context("failed to build API client")
}

/// Build around an explicit credential store (tests, ephemeral hosts).
pub fn build_app_with_credentials(
    config: ClientConfig,
    credentials: Arc<dyn CredentialStore>,
) -> Result<CampusApp, ApiError> {
    let api = Arc::new(HttpAuthApi::new(&config, credentials.clone())?);
    let store = Arc::new(SessionStore::new(api.clone(), credentials.clone()));
    let navigator = Navigator::standard(config.paths.clone(), store.clone());
    let flows = AuthFlows::new(api.clone(), store.clone(), config.paths.clone());

    tracing::info!(api_base_url = %config.api_base_url, "campus client configured");

    Ok(CampusApp {
        config,
        credentials,
        api,
        store,
        navigator,
        flows,
    })
}
