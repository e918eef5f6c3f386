use serde::{Deserialize, Serialize};

/// Where an account stands in the onboarding/approval workflow.
///
/// Only the server moves an account between states; the client just reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
    /// Signed up, profile not submitted yet.
    PendingProfile,
    /// Profile submitted, waiting for an administrator.
    PendingApproval,
    Approved,
    /// Profile refused; the user has to fix and resubmit it.
    Rejected,
}

impl ApprovalStatus {
    pub const ALL: [ApprovalStatus; 4] = [
        ApprovalStatus::PendingProfile,
        ApprovalStatus::PendingApproval,
        ApprovalStatus::Approved,
        ApprovalStatus::Rejected,
    ];

    /// Statuses that must go through profile setup before anything else.
    pub fn needs_profile(&self) -> bool {
        match self {
            ApprovalStatus::PendingProfile | ApprovalStatus::Rejected => true,
            ApprovalStatus::PendingApproval | ApprovalStatus::Approved => false,
        }
    }

    /// Statuses that keep academic and admin modules closed.
    pub fn is_unapproved(&self) -> bool {
        match self {
            ApprovalStatus::PendingProfile
            | ApprovalStatus::PendingApproval
            | ApprovalStatus::Rejected => true,
            ApprovalStatus::Approved => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::PendingProfile => "PENDING_PROFILE",
            ApprovalStatus::PendingApproval => "PENDING_APPROVAL",
            ApprovalStatus::Approved => "APPROVED",
            ApprovalStatus::Rejected => "REJECTED",
        }
    }
}

impl core::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
