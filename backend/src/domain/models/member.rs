use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Access level of a member within a ranch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full control: invite, change roles, remove members, delete the
    /// ranch, transfer ownership.
    Manager,
    /// Edit herd data; no team management.
    Write,
    /// View only.
    Read,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Manager => "manager",
            Role::Write => "write",
            Role::Read => "read",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "manager" => Some(Role::Manager),
            "write" => Some(Role::Write),
            "read" => Some(Role::Read),
            _ => None,
        }
    }
}

/// A person's membership in a ranch. Created in a pending state keyed
/// by email; `user_id` is bound once the invited email signs in and
/// accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub ranch_id: String,
    pub email: String,
    pub role: Role,
    pub accepted: bool,
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
}
