//! Session store: the single source of truth for "who is signed in".

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use campusgate_auth::{Identity, Session};

use crate::{AuthApi, CredentialStore};

/// Owned, injectable session holder.
///
/// `identity` and `loading` live behind one lock and are always read as a
/// snapshot, so a reader never pairs `loading == false` with a stale identity.
/// The lock is never held across an `.await`.
pub struct SessionStore {
    session: RwLock<Session>,
    bootstrapped: AtomicBool,
    api: Arc<dyn AuthApi>,
    credentials: Arc<dyn CredentialStore>,
}

impl SessionStore {
    pub fn new(api: Arc<dyn AuthApi>, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            session: RwLock::new(Session::loading()),
            bootstrapped: AtomicBool::new(false),
            api,
            credentials,
        }
    }

    pub fn current_session(&self) -> Session {
        self.read().clone()
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    /// Resolve the initial session from the identity endpoint.
    ///
    /// Runs once; later calls return the current snapshot. Any failure
    /// resolves to "unauthenticated". An identity stored by [`login`] while
    /// the check was pending is kept. If the future is dropped before the
    /// endpoint answers, the session still leaves the loading state.
    ///
    /// [`login`]: SessionStore::login
    pub async fn bootstrap(&self) -> Session {
        if self.bootstrapped.swap(true, Ordering::SeqCst) {
            tracing::debug!("session bootstrap already ran");
            return self.current_session();
        }

        let mut guard = BootstrapGuard {
            store: self,
            settled: false,
        };

        match self.api.current_user().await {
            Ok(identity) => {
                tracing::info!(
                    email = %identity.email,
                    role = %identity.role,
                    approval_status = %identity.approval_status,
                    "session restored"
                );
                guard.settle(Some(identity))
            }
            Err(err) => {
                tracing::debug!(error = %err, "no session restored");
                let session = guard.settle(None);
                if err.is_unauthorized() && !session.is_authenticated() {
                    self.clear_credential();
                }
                session
            }
        }
    }

    /// Store the identity returned by a successful authentication call.
    ///
    /// Does not touch `loading`; only [`SessionStore::bootstrap`] ends it.
    pub fn login(&self, identity: Identity) {
        tracing::info!(email = %identity.email, role = %identity.role, "signed in");
        self.write().identity = Some(identity);
    }

    /// Best-effort remote logout; local state is cleared no matter what.
    pub async fn logout(&self) {
        let _clear = SignOutGuard { store: self };

        if let Err(err) = self.api.logout().await {
            tracing::warn!(error = %err, "remote logout failed; clearing local session anyway");
        }
    }

    /// Re-read the identity after the server changed it (profile, approval).
    ///
    /// A failed refresh signs the user out locally.
    pub async fn refresh(&self) -> Option<Identity> {
        match self.api.current_user().await {
            Ok(identity) => {
                tracing::debug!(approval_status = %identity.approval_status, "session refreshed");
                self.write().identity = Some(identity.clone());
                Some(identity)
            }
            Err(err) => {
                tracing::warn!(error = %err, "session refresh failed; signing out locally");
                if err.is_unauthorized() {
                    self.clear_credential();
                }
                self.write().identity = None;
                None
            }
        }
    }

    /// Drop the session after the API rejected the credential.
    pub fn expire(&self) {
        tracing::info!("session expired");
        self.clear_local();
    }

    fn clear_local(&self) {
        self.clear_credential();
        self.write().identity = None;
    }

    fn clear_credential(&self) {
        if let Err(err) = self.credentials.clear() {
            tracing::warn!(error = %err, "failed to clear stored credential");
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Session> {
        self.session.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.session.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Clears the local session when dropped, whether logout returned, failed,
/// panicked or was cancelled.
struct SignOutGuard<'a> {
    store: &'a SessionStore,
}

impl Drop for SignOutGuard<'_> {
    fn drop(&mut self) {
        self.store.clear_local();
        tracing::info!("signed out");
    }
}

/// Ends the loading state even if bootstrap never settles explicitly.
struct BootstrapGuard<'a> {
    store: &'a SessionStore,
    settled: bool,
}

impl BootstrapGuard<'_> {
    /// An identity already stored by `login` wins over the bootstrap result.
    fn settle(&mut self, identity: Option<Identity>) -> Session {
        self.settled = true;
        let mut session = self.store.write();
        if session.identity.is_none() {
            session.identity = identity;
        }
        session.loading = false;
        session.clone()
    }
}

impl Drop for BootstrapGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::warn!("session bootstrap abandoned; keeping current identity");
            self.store.write().loading = false;
        }
    }
}
