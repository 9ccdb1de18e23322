use serde::{Deserialize, Serialize};

/// Access level of a member within a ranch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Manager,
    Write,
    Read,
}

/// Production status of a cow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CowStatus {
    Wet,
    Dry,
    Bred,
    Bull,
    Steer,
    Cull,
}

/// Kind of physical identifier attached to a cow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TagLabel {
    #[serde(rename = "ear tag")]
    EarTag,
    #[serde(rename = "RFID")]
    Rfid,
    #[serde(rename = "brand")]
    Brand,
    #[serde(rename = "other")]
    Other,
}

/// Subscription tier bounding the number of cows a ranch may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Free,
    Starter,
    Pro,
    Max,
}

/// A physical identifier (ear tag, RFID, brand) attached to a cow.
/// Tag numbers are unique across a ranch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub label: TagLabel,
    pub number: String,
}

/// Free-text note on a cow. Append-only; notes are never edited or
/// deleted through the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CowNote {
    pub id: String,
    pub text: String,
    /// RFC 3339 timestamp
    pub created_at: String,
}

/// A recorded medical issue on a cow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalIssue {
    pub id: String,
    pub label: String,
    /// RFC 3339 timestamp
    pub created_at: String,
}

/// An animal record; the central entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cow {
    pub id: String,
    pub ranch_id: String,
    pub description: Option<String>,
    pub status: CowStatus,
    pub breed: Option<String>,
    /// 1-12
    pub birth_month: Option<u32>,
    /// e.g. 2024
    pub birth_year: Option<i32>,
    pub pasture_id: Option<String>,
    /// Photo URIs; the files themselves live with the file-storage provider.
    pub photos: Vec<String>,
    /// Tag number of the mother cow. Resolved lazily at read time; may
    /// reference a number no cow currently holds.
    pub mother_tag: Option<String>,
    pub tags: Vec<Tag>,
    pub notes: Vec<CowNote>,
    pub medical: Vec<MedicalIssue>,
    /// RFC 3339 timestamps
    pub created_at: String,
    pub updated_at: String,
}

/// A named location grouping cows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pasture {
    pub id: String,
    pub name: String,
    pub created_at: String,
}

/// A tenant/workspace owning a herd, members, and configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranch {
    pub id: String,
    pub name: String,
    pub owner_user_id: String,
    pub created_at: String,
}

/// A person's membership in a ranch. `user_id` is bound once the
/// invited email accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub email: String,
    pub role: Role,
    pub accepted: bool,
    pub user_id: Option<String>,
    pub created_at: String,
}

/// Billing snapshot for a ranch, as stored on the ranch row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RanchBilling {
    pub subscription_tier: Tier,
    pub subscription_status: String,
    pub subscription_override: Option<String>,
    pub trial_ends_at: Option<String>,
    pub current_period_end: Option<String>,
    pub peak_cow_count: u32,
    /// Derived: whether the ranch is currently blocked from writes.
    pub read_only: bool,
    /// Cow cap of the current tier.
    pub max_cows: u32,
}

// ── Requests ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateRanchRequest {
    pub name: String,
    pub owner_user_id: String,
    pub owner_email: String,
}

/// A tag as entered in a form; blank numbers are filtered out before
/// validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagInput {
    pub label: TagLabel,
    pub number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateCowRequest {
    pub description: Option<String>,
    pub status: CowStatus,
    pub breed: Option<String>,
    pub birth_month: Option<u32>,
    pub birth_year: Option<i32>,
    pub pasture_id: Option<String>,
    #[serde(default)]
    pub photos: Vec<String>,
    pub mother_tag: Option<String>,
    pub tags: Vec<TagInput>,
}

/// Partial update: absent fields are left unchanged. When `tags` is
/// present the whole tag set is replaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateCowRequest {
    pub description: Option<String>,
    pub status: Option<CowStatus>,
    pub breed: Option<String>,
    pub birth_month: Option<u32>,
    pub birth_year: Option<i32>,
    pub pasture_id: Option<String>,
    pub photos: Option<Vec<String>>,
    pub mother_tag: Option<String>,
    pub tags: Option<Vec<TagInput>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddNoteRequest {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddMedicalIssueRequest {
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InviteMemberRequest {
    pub acting_user_id: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRoleRequest {
    pub acting_user_id: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoveMemberRequest {
    pub acting_user_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcceptInviteRequest {
    pub email: String,
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferOwnershipRequest {
    pub acting_user_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddPastureRequest {
    pub name: String,
}

// ── Responses ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RanchListResponse {
    pub ranches: Vec<Ranch>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CowListResponse {
    pub cows: Vec<Cow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberListResponse {
    pub members: Vec<Member>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PastureListResponse {
    pub pastures: Vec<Pasture>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetListResponse {
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferOwnershipResponse {
    pub new_owner: Member,
    pub previous_owner: Option<Member>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportHerdResponse {
    pub csv_content: String,
    pub filename: String,
    pub cow_count: usize,
    pub ranch_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success_message: String,
}

/// Error body returned by the API. `number` and `cow_id` are populated
/// only for duplicate-tag conflicts, so clients can offer "go to that
/// cow" recovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cow_id: Option<String>,
}
