//! Domain-level command and query types
//! These structs are used by services inside the domain layer and are
//! **not** exposed over the public API. The REST layer is responsible
//! for mapping the public DTOs defined in the `shared` crate to these
//! internal types.

pub mod herd {
    use crate::domain::models::cow::{Cow, CowStatus, TagLabel};
    use crate::domain::search::SortKey;

    /// A tag as drafted by the caller; numbers are trimmed and blank
    /// drafts dropped before validation.
    #[derive(Debug, Clone, PartialEq)]
    pub struct TagDraft {
        pub label: TagLabel,
        pub number: String,
    }

    /// Input for creating a new cow.
    #[derive(Debug, Clone)]
    pub struct CreateCowCommand {
        pub ranch_id: String,
        pub description: Option<String>,
        pub status: CowStatus,
        pub breed: Option<String>,
        pub birth_month: Option<u32>,
        pub birth_year: Option<i32>,
        pub pasture_id: Option<String>,
        pub photos: Vec<String>,
        pub mother_tag: Option<String>,
        pub tags: Vec<TagDraft>,
    }

    /// Partial update. Absent fields stay unchanged; a present `tags`
    /// replaces the whole tag set.
    #[derive(Debug, Clone, Default)]
    pub struct UpdateCowCommand {
        pub ranch_id: String,
        pub cow_id: String,
        pub description: Option<String>,
        pub status: Option<CowStatus>,
        pub breed: Option<String>,
        pub birth_month: Option<u32>,
        pub birth_year: Option<i32>,
        pub pasture_id: Option<String>,
        pub photos: Option<Vec<String>>,
        pub mother_tag: Option<String>,
        pub tags: Option<Vec<TagDraft>>,
    }

    #[derive(Debug, Clone)]
    pub struct CreateCowResult {
        pub cow: Cow,
    }

    #[derive(Debug, Clone)]
    pub struct UpdateCowResult {
        pub cow: Cow,
    }

    #[derive(Debug, Clone)]
    pub struct DeleteCowResult {
        pub success_message: String,
    }

    /// Input for herd search: free text, possibly a `MM/YYYY-MM/YYYY`
    /// birth range, with an optional sort applied to the result.
    #[derive(Debug, Clone)]
    pub struct SearchCommand {
        pub ranch_id: String,
        pub query: String,
        pub sort: Option<SortKey>,
    }

    #[derive(Debug, Clone)]
    pub struct SearchResult {
        pub cows: Vec<Cow>,
    }

    #[derive(Debug, Clone)]
    pub struct AddNoteCommand {
        pub ranch_id: String,
        pub cow_id: String,
        pub text: String,
    }

    #[derive(Debug, Clone)]
    pub struct AddMedicalIssueCommand {
        pub ranch_id: String,
        pub cow_id: String,
        pub label: String,
    }
}

pub mod team {
    use crate::domain::models::member::{Member, Role};

    /// Input for inviting a member. The acting user must be a manager;
    /// invites are created as read or write only.
    #[derive(Debug, Clone)]
    pub struct InviteMemberCommand {
        pub ranch_id: String,
        pub acting_user_id: String,
        pub email: String,
        pub role: Role,
    }

    #[derive(Debug, Clone)]
    pub struct AcceptInviteCommand {
        pub ranch_id: String,
        pub email: String,
        pub user_id: String,
    }

    #[derive(Debug, Clone)]
    pub struct ChangeRoleCommand {
        pub ranch_id: String,
        pub acting_user_id: String,
        pub member_id: String,
        pub new_role: Role,
    }

    #[derive(Debug, Clone)]
    pub struct RemoveMemberCommand {
        pub ranch_id: String,
        pub acting_user_id: String,
        pub member_id: String,
    }

    #[derive(Debug, Clone)]
    pub struct TransferOwnershipCommand {
        pub ranch_id: String,
        pub acting_user_id: String,
        pub member_id: String,
    }

    #[derive(Debug, Clone)]
    pub struct InviteMemberResult {
        pub member: Member,
    }

    #[derive(Debug, Clone)]
    pub struct AcceptInviteResult {
        pub member: Member,
    }

    #[derive(Debug, Clone)]
    pub struct ChangeRoleResult {
        pub member: Member,
    }

    #[derive(Debug, Clone)]
    pub struct RemoveMemberResult {
        pub success_message: String,
    }

    #[derive(Debug, Clone)]
    pub struct TransferOwnershipResult {
        pub new_owner: Member,
        pub previous_owner: Option<Member>,
    }
}

pub mod ranches {
    use crate::domain::models::ranch::{Pasture, Ranch};

    #[derive(Debug, Clone)]
    pub struct CreateRanchCommand {
        pub name: String,
        pub owner_user_id: String,
        pub owner_email: String,
    }

    #[derive(Debug, Clone)]
    pub struct DeleteRanchCommand {
        pub ranch_id: String,
        pub acting_user_id: String,
    }

    #[derive(Debug, Clone)]
    pub struct AddPastureCommand {
        pub ranch_id: String,
        pub name: String,
    }

    #[derive(Debug, Clone)]
    pub struct CreateRanchResult {
        pub ranch: Ranch,
    }

    #[derive(Debug, Clone)]
    pub struct DeleteRanchResult {
        pub success_message: String,
    }

    #[derive(Debug, Clone)]
    pub struct AddPastureResult {
        pub pasture: Pasture,
    }
}

pub mod export {
    /// Input for a herd export. `custom_path` only matters for
    /// export-to-path; empty means the default Documents location.
    #[derive(Debug, Clone)]
    pub struct ExportHerdCommand {
        pub ranch_id: String,
    }

    #[derive(Debug, Clone)]
    pub struct ExportToPathCommand {
        pub ranch_id: String,
        pub custom_path: Option<String>,
    }

    #[derive(Debug, Clone)]
    pub struct ExportHerdResult {
        pub csv_content: String,
        pub filename: String,
        pub cow_count: usize,
        pub ranch_name: String,
    }

    #[derive(Debug, Clone)]
    pub struct ExportToPathResult {
        pub success: bool,
        pub message: String,
        pub file_path: String,
        pub cow_count: usize,
    }
}
