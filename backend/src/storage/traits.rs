//! # Storage Traits
//!
//! Abstraction over the record store so the domain layer can work with
//! different backends (the CSV/YAML file store, fault-injecting test
//! doubles) without modification. The store owns two hard rules the
//! domain relies on: the ranch-wide tag-number uniqueness constraint,
//! and cascade delete from ranch to everything beneath it.

use anyhow::Result;
use thiserror::Error;

use crate::domain::models::cow::{Cow, MedicalIssue, Note, Tag};
use crate::domain::models::member::Member;
use crate::domain::models::ranch::{Pasture, Ranch};

/// Constraint-violation signal raised by a tag store when an insert
/// would break the ranch-wide unique-number rule. Carries the current
/// holder so callers can point at the conflicting cow. This is the only
/// store error the domain layer inspects and reinterprets.
#[derive(Debug, Clone, Error)]
#[error("tag number '{number}' is already attached to cow {cow_id}")]
pub struct TagConflict {
    pub number: String,
    pub cow_id: String,
}

/// A tag row as the store keeps it: the tag plus the cow it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct TagRow {
    pub cow_id: String,
    pub tag: Tag,
}

/// A note row with its owning cow.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteRow {
    pub cow_id: String,
    pub note: Note,
}

/// A medical-issue row with its owning cow.
#[derive(Debug, Clone, PartialEq)]
pub struct MedicalRow {
    pub cow_id: String,
    pub issue: MedicalIssue,
}

/// Ranch rows, including billing fields.
pub trait RanchStorage: Send + Sync {
    fn store_ranch(&self, ranch: &Ranch) -> Result<()>;

    fn get_ranch(&self, ranch_id: &str) -> Result<Option<Ranch>>;

    fn list_ranches(&self) -> Result<Vec<Ranch>>;

    fn update_ranch(&self, ranch: &Ranch) -> Result<()>;

    /// Delete a ranch and everything beneath it: members, cows, tags,
    /// notes, pastures, presets, medical rows.
    fn delete_ranch(&self, ranch_id: &str) -> Result<()>;
}

/// Cow rows: scalar fields only. Tags, notes, and medical issues are
/// separate rows, so a cow insert and its tag insert are two distinct
/// store operations with no transaction spanning them.
pub trait CowStorage: Send + Sync {
    fn store_cow(&self, ranch_id: &str, cow: &Cow) -> Result<()>;

    /// Returns the cow row with empty tag/note/medical lists.
    fn get_cow(&self, ranch_id: &str, cow_id: &str) -> Result<Option<Cow>>;

    fn list_cows(&self, ranch_id: &str) -> Result<Vec<Cow>>;

    fn update_cow(&self, ranch_id: &str, cow: &Cow) -> Result<()>;

    fn delete_cow(&self, ranch_id: &str, cow_id: &str) -> Result<()>;
}

/// Tag rows. `insert_tags` enforces the uniqueness constraint and is
/// the final arbiter of concurrent writers.
pub trait TagStorage: Send + Sync {
    /// Insert tags for a cow. Fails with [`TagConflict`] if any trimmed
    /// number already exists in the ranch or repeats within the batch;
    /// on failure nothing is written.
    fn insert_tags(&self, ranch_id: &str, cow_id: &str, tags: &[Tag]) -> Result<()>;

    /// Remove all tags of a cow, returning the removed rows in order.
    fn delete_tags_for_cow(&self, ranch_id: &str, cow_id: &str) -> Result<Vec<Tag>>;

    fn list_tags(&self, ranch_id: &str) -> Result<Vec<TagRow>>;

    fn list_tags_for_cow(&self, ranch_id: &str, cow_id: &str) -> Result<Vec<Tag>>;
}

/// Note rows; append-only apart from cascade deletion with the cow.
pub trait NoteStorage: Send + Sync {
    fn append_note(&self, ranch_id: &str, cow_id: &str, note: &Note) -> Result<()>;

    fn list_notes_for_cow(&self, ranch_id: &str, cow_id: &str) -> Result<Vec<Note>>;

    fn list_notes(&self, ranch_id: &str) -> Result<Vec<NoteRow>>;

    fn delete_notes_for_cow(&self, ranch_id: &str, cow_id: &str) -> Result<()>;
}

/// Medical-issue rows plus the label search the store offers.
pub trait MedicalStorage: Send + Sync {
    fn record_issue(&self, ranch_id: &str, cow_id: &str, issue: &MedicalIssue) -> Result<()>;

    fn list_issues_for_cow(&self, ranch_id: &str, cow_id: &str) -> Result<Vec<MedicalIssue>>;

    fn list_issues(&self, ranch_id: &str) -> Result<Vec<MedicalRow>>;

    /// Case-insensitive substring match against issue labels; returns
    /// owning cow ids, deduplicated, in row order.
    fn search_labels(&self, ranch_id: &str, query: &str) -> Result<Vec<String>>;

    fn delete_issues_for_cow(&self, ranch_id: &str, cow_id: &str) -> Result<()>;
}

/// Member rows.
pub trait MemberStorage: Send + Sync {
    fn store_member(&self, ranch_id: &str, member: &Member) -> Result<()>;

    fn get_member(&self, ranch_id: &str, member_id: &str) -> Result<Option<Member>>;

    fn list_members(&self, ranch_id: &str) -> Result<Vec<Member>>;

    fn update_member(&self, ranch_id: &str, member: &Member) -> Result<()>;

    fn delete_member(&self, ranch_id: &str, member_id: &str) -> Result<()>;
}

/// Pasture rows.
pub trait PastureStorage: Send + Sync {
    fn store_pasture(&self, ranch_id: &str, pasture: &Pasture) -> Result<()>;

    fn list_pastures(&self, ranch_id: &str) -> Result<Vec<Pasture>>;

    fn delete_pasture(&self, ranch_id: &str, pasture_id: &str) -> Result<()>;
}

/// Ranch-scoped preset label lists (breeds, medical suggestions),
/// deduplicated on add.
pub trait PresetStorage: Send + Sync {
    /// Returns true when the label was new and got added.
    fn add_breed(&self, ranch_id: &str, label: &str) -> Result<bool>;

    fn list_breeds(&self, ranch_id: &str) -> Result<Vec<String>>;

    /// Returns true when the label was new and got added.
    fn add_medical_preset(&self, ranch_id: &str, label: &str) -> Result<bool>;

    fn list_medical_presets(&self, ranch_id: &str) -> Result<Vec<String>>;
}

/// Factory trait for the repositories the herd write path touches.
/// Lets tests drive `HerdService` with a connection whose tag
/// repository interleaves a rival writer into the race window.
pub trait Connection: Send + Sync + Clone {
    type Cows: CowStorage + Clone;
    type Tags: TagStorage + Clone;
    type Notes: NoteStorage + Clone;
    type Medical: MedicalStorage + Clone;
    type Presets: PresetStorage + Clone;

    fn create_cow_repository(&self) -> Self::Cows;

    fn create_tag_repository(&self) -> Self::Tags;

    fn create_note_repository(&self) -> Self::Notes;

    fn create_medical_repository(&self) -> Self::Medical;

    fn create_preset_repository(&self) -> Self::Presets;
}
