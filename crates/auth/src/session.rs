use serde::{Deserialize, Serialize};

use crate::Identity;

/// Snapshot of "who is signed in".
///
/// `loading` is true only until the first identity check resolves. With
/// `loading == false`, an absent identity means definitively unauthenticated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub identity: Option<Identity>,
    pub loading: bool,
}

impl Session {
    /// State at process start, before the identity check.
    pub fn loading() -> Self {
        Self {
            identity: None,
            loading: true,
        }
    }

    pub fn unauthenticated() -> Self {
        Self {
            identity: None,
            loading: false,
        }
    }

    pub fn authenticated(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
            loading: false,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::loading()
    }
}
