use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::models::billing::RanchBilling;

/// A tenant/workspace owning a herd, members, and configuration.
/// Deleting a ranch cascades to everything beneath it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranch {
    pub id: String,
    pub name: String,
    pub owner_user_id: String,
    pub billing: RanchBilling,
    pub created_at: DateTime<Utc>,
}

/// A named location grouping cows. Cows reference a pasture by id;
/// deleting a pasture leaves those references dangling and the read
/// side treats them as unassigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pasture {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
