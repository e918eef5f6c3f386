use serde::{Deserialize, Deserializer, Serialize};

use campusgate_core::Email;

use crate::{ApprovalStatus, Role};

/// The authenticated account as reported by the identity endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub email: Email,

    /// Missing or null on the wire means [`Role::User`].
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: Role,

    pub approval_status: ApprovalStatus,

    /// Platform operator; bypasses every private-route rule.
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_system_admin: bool,

    /// Only meaningful while `approval_status` is [`ApprovalStatus::Rejected`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

impl Identity {
    pub fn new(email: Email, role: Role, approval_status: ApprovalStatus) -> Self {
        Self {
            email,
            role,
            approval_status,
            is_system_admin: false,
            rejection_reason: None,
        }
    }

    pub fn with_system_admin(mut self, is_system_admin: bool) -> Self {
        self.is_system_admin = is_system_admin;
        self
    }

    pub fn with_rejection_reason(mut self, reason: impl Into<String>) -> Self {
        self.rejection_reason = Some(reason.into());
        self
    }

    /// Rejection reason, if the account is currently rejected.
    pub fn active_rejection_reason(&self) -> Option<&str> {
        match self.approval_status {
            ApprovalStatus::Rejected => self.rejection_reason.as_deref(),
            _ => None,
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
