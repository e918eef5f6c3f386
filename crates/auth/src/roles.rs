use serde::{Deserialize, Serialize};

/// Role tag carried by an account.
///
/// Closed set: adding a role forces every gating match to be revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Default for accounts whose role the server did not report.
    #[default]
    User,
    Staff,
    Admin,
    Teacher,
    Accountant,
    Student,
    Guardian,
}

impl Role {
    pub const ALL: [Role; 7] = [
        Role::User,
        Role::Staff,
        Role::Admin,
        Role::Teacher,
        Role::Accountant,
        Role::Student,
        Role::Guardian,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Staff => "STAFF",
            Role::Admin => "ADMIN",
            Role::Teacher => "TEACHER",
            Role::Accountant => "ACCOUNTANT",
            Role::Student => "STUDENT",
            Role::Guardian => "GUARDIAN",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
