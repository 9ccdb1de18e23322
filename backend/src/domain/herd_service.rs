use chrono::Utc;
use std::collections::{HashMap, HashSet};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::domain::billing_service::BillingService;
use crate::domain::commands::herd::{
    AddMedicalIssueCommand, AddNoteCommand, CreateCowCommand, CreateCowResult, DeleteCowResult,
    SearchCommand, SearchResult, TagDraft, UpdateCowCommand, UpdateCowResult,
};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::lineage::{calves_of, TagIndex};
use crate::domain::models::cow::{Cow, MedicalIssue, MotherTag, Note, Tag};
use crate::domain::search;
use crate::storage::csv::PastureRepository;
use crate::storage::traits::{
    Connection, CowStorage, MedicalStorage, NoteStorage, PastureStorage, PresetStorage,
    TagStorage,
};

/// Service for the herd: cow reads and writes, notes, medical records,
/// search, and lineage resolution.
///
/// The write path guards the ranch-wide tag-uniqueness invariant. The
/// store's constraint is the last line of defense against concurrent
/// writers; this service pre-checks so conflicts fail fast with the
/// holding cow attached, and compensates when the store loses the race
/// anyway, so no partial cow ever survives a failed write.
#[derive(Clone)]
pub struct HerdService<C: Connection> {
    cow_repository: C::Cows,
    tag_repository: C::Tags,
    note_repository: C::Notes,
    medical_repository: C::Medical,
    preset_repository: C::Presets,
    pasture_repository: PastureRepository,
    billing_service: BillingService,
}

impl<C: Connection> HerdService<C> {
    pub fn new(
        connection: C,
        billing_service: BillingService,
        pasture_repository: PastureRepository,
    ) -> Self {
        Self {
            cow_repository: connection.create_cow_repository(),
            tag_repository: connection.create_tag_repository(),
            note_repository: connection.create_note_repository(),
            medical_repository: connection.create_medical_repository(),
            preset_repository: connection.create_preset_repository(),
            pasture_repository,
            billing_service,
        }
    }

    /// Create a new cow with its tags.
    pub fn create_cow(&self, command: CreateCowCommand) -> DomainResult<CreateCowResult> {
        info!(
            "Creating cow in ranch {} with {} tag draft(s)",
            command.ranch_id,
            command.tags.len()
        );

        let drafts = normalize_drafts(&command.tags);
        if drafts.is_empty() {
            return Err(DomainError::Validation(
                "at least one tag with a number is required".to_string(),
            ));
        }
        validate_drafts(&drafts)?;
        validate_birth_fields(command.birth_month, command.birth_year)?;

        // Billing gate before anything is written.
        let herd_size = self
            .cow_repository
            .list_cows(&command.ranch_id)
            .map_err(DomainError::from_store)?
            .len() as u32;
        let gate = self.billing_service.can_add_cow(&command.ranch_id, herd_size)?;
        if !gate.allowed {
            return Err(DomainError::Authorization(gate.reason.unwrap_or_else(
                || "Writes are disabled for this ranch".to_string(),
            )));
        }

        // Pre-check so duplicates fail fast, before any write, with the
        // holding cow attached.
        let existing = self
            .tag_repository
            .list_tags(&command.ranch_id)
            .map_err(DomainError::from_store)?;
        for draft in &drafts {
            if let Some(row) = existing.iter().find(|row| row.tag.number == draft.number) {
                info!(
                    "Duplicate tag pre-check hit: '{}' held by cow {}",
                    draft.number, row.cow_id
                );
                return Err(DomainError::DuplicateTag {
                    number: draft.number.clone(),
                    cow_id: row.cow_id.clone(),
                });
            }
        }

        let now = Utc::now();
        let mut cow = Cow {
            id: Uuid::new_v4().to_string(),
            ranch_id: command.ranch_id.clone(),
            description: command.description,
            status: command.status,
            breed: command
                .breed
                .map(|b| b.trim().to_string())
                .filter(|b| !b.is_empty()),
            birth_month: command.birth_month,
            birth_year: command.birth_year,
            pasture_id: command.pasture_id,
            photos: command.photos,
            mother_tag: command
                .mother_tag
                .map(MotherTag::new)
                .filter(|m| !m.number().is_empty()),
            tags: Vec::new(),
            notes: Vec::new(),
            medical: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        self.cow_repository
            .store_cow(&command.ranch_id, &cow)
            .map_err(DomainError::from_store)?;

        let tags = drafts_to_tags(&drafts);
        self.guarded_tag_insert(&command.ranch_id, &cow.id, &tags)?;
        cow.tags = tags;

        if let Some(breed) = &cow.breed {
            if self
                .preset_repository
                .add_breed(&command.ranch_id, breed)
                .map_err(DomainError::from_store)?
            {
                debug!("Added new breed preset '{}'", breed);
            }
        }

        self.billing_service
            .record_peak_cow_count(&command.ranch_id, herd_size + 1)?;

        info!("Created cow {} in ranch {}", cow.id, cow.ranch_id);
        Ok(CreateCowResult { cow })
    }

    /// Guarded insert with compensating delete. The tag store's
    /// uniqueness check is the final arbiter; when a rival writer takes
    /// a number between the pre-check and this insert, the freshly
    /// created cow row is deleted again so no partial cow survives.
    fn guarded_tag_insert(&self, ranch_id: &str, cow_id: &str, tags: &[Tag]) -> DomainResult<()> {
        if let Err(err) = self.tag_repository.insert_tags(ranch_id, cow_id, tags) {
            warn!(
                "Tag insert for cow {} failed, removing the cow row again: {}",
                cow_id, err
            );
            if let Err(cleanup) = self.cow_repository.delete_cow(ranch_id, cow_id) {
                error!("Compensating delete for cow {} failed: {:#}", cow_id, cleanup);
            }
            return Err(DomainError::from_store(err));
        }
        Ok(())
    }

    /// Update a cow. Scalar fields commit first and are deliberately
    /// not rolled back when the tag step fails afterwards; the tag set
    /// itself is replaced under a snapshot so the cow never loses its
    /// tags on failure.
    pub fn update_cow(&self, command: UpdateCowCommand) -> DomainResult<UpdateCowResult> {
        info!("Updating cow {} in ranch {}", command.cow_id, command.ranch_id);

        let mut cow = self
            .cow_repository
            .get_cow(&command.ranch_id, &command.cow_id)
            .map_err(DomainError::from_store)?
            .ok_or_else(|| DomainError::NotFound(format!("cow {}", command.cow_id)))?;

        validate_birth_fields(command.birth_month, command.birth_year)?;

        if let Some(description) = command.description {
            cow.description = Some(description);
        }
        if let Some(status) = command.status {
            cow.status = status;
        }
        if let Some(breed) = command.breed {
            let trimmed = breed.trim().to_string();
            cow.breed = if trimmed.is_empty() { None } else { Some(trimmed) };
            if let Some(b) = &cow.breed {
                if self
                    .preset_repository
                    .add_breed(&command.ranch_id, b)
                    .map_err(DomainError::from_store)?
                {
                    debug!("Added new breed preset '{}'", b);
                }
            }
        }
        if let Some(birth_month) = command.birth_month {
            cow.birth_month = Some(birth_month);
        }
        if let Some(birth_year) = command.birth_year {
            cow.birth_year = Some(birth_year);
        }
        if let Some(pasture_id) = command.pasture_id {
            cow.pasture_id = Some(pasture_id);
        }
        if let Some(photos) = command.photos {
            cow.photos = photos;
        }
        if let Some(mother_tag) = command.mother_tag {
            let mother = MotherTag::new(mother_tag);
            cow.mother_tag = if mother.number().is_empty() {
                None
            } else {
                Some(mother)
            };
        }
        cow.updated_at = Utc::now();

        self.cow_repository
            .update_cow(&command.ranch_id, &cow)
            .map_err(DomainError::from_store)?;

        if let Some(drafts) = command.tags {
            // Blank numbers mean "remove this tag" from the editing
            // form's point of view.
            let drafts = normalize_drafts(&drafts);
            if drafts.is_empty() {
                return Err(DomainError::Validation(
                    "at least one tag is required".to_string(),
                ));
            }
            validate_drafts(&drafts)?;

            // Pre-check against every OTHER cow in the ranch.
            let existing = self
                .tag_repository
                .list_tags(&command.ranch_id)
                .map_err(DomainError::from_store)?;
            for draft in &drafts {
                if let Some(row) = existing.iter().find(|row| {
                    row.cow_id != command.cow_id && row.tag.number == draft.number
                }) {
                    return Err(DomainError::DuplicateTag {
                        number: draft.number.clone(),
                        cow_id: row.cow_id.clone(),
                    });
                }
            }

            // Snapshot the current rows, replace the set, and restore
            // the snapshot verbatim if the store rejects the insert.
            let snapshot = self
                .tag_repository
                .delete_tags_for_cow(&command.ranch_id, &command.cow_id)
                .map_err(DomainError::from_store)?;
            let tags = drafts_to_tags(&drafts);
            if let Err(err) =
                self.tag_repository
                    .insert_tags(&command.ranch_id, &command.cow_id, &tags)
            {
                warn!(
                    "Replacing tags for cow {} failed, restoring previous set: {}",
                    command.cow_id, err
                );
                if let Err(restore) =
                    self.tag_repository
                        .insert_tags(&command.ranch_id, &command.cow_id, &snapshot)
                {
                    error!(
                        "Failed to restore tag snapshot for cow {}: {:#}",
                        command.cow_id, restore
                    );
                }
                return Err(DomainError::from_store(err));
            }
            cow.tags = tags;
        } else {
            cow.tags = self
                .tag_repository
                .list_tags_for_cow(&command.ranch_id, &command.cow_id)
                .map_err(DomainError::from_store)?;
        }

        cow.notes = self
            .note_repository
            .list_notes_for_cow(&command.ranch_id, &command.cow_id)
            .map_err(DomainError::from_store)?;
        cow.medical = self
            .medical_repository
            .list_issues_for_cow(&command.ranch_id, &command.cow_id)
            .map_err(DomainError::from_store)?;

        info!("Updated cow {} in ranch {}", cow.id, command.ranch_id);
        Ok(UpdateCowResult { cow })
    }

    /// Delete a cow and its dependent rows.
    pub fn delete_cow(&self, ranch_id: &str, cow_id: &str) -> DomainResult<DeleteCowResult> {
        info!("Deleting cow {} in ranch {}", cow_id, ranch_id);

        let cow = self.get_cow(ranch_id, cow_id)?;

        self.tag_repository
            .delete_tags_for_cow(ranch_id, cow_id)
            .map_err(DomainError::from_store)?;
        self.note_repository
            .delete_notes_for_cow(ranch_id, cow_id)
            .map_err(DomainError::from_store)?;
        self.medical_repository
            .delete_issues_for_cow(ranch_id, cow_id)
            .map_err(DomainError::from_store)?;
        self.cow_repository
            .delete_cow(ranch_id, cow_id)
            .map_err(DomainError::from_store)?;

        let label = cow
            .primary_tag()
            .map(|t| t.number.clone())
            .unwrap_or_else(|| cow.id.clone());
        Ok(DeleteCowResult {
            success_message: format!("Cow '{}' deleted successfully", label),
        })
    }

    /// Fetch one cow with its tags, notes, and medical issues.
    pub fn get_cow(&self, ranch_id: &str, cow_id: &str) -> DomainResult<Cow> {
        let mut cow = self
            .cow_repository
            .get_cow(ranch_id, cow_id)
            .map_err(DomainError::from_store)?
            .ok_or_else(|| DomainError::NotFound(format!("cow {}", cow_id)))?;

        cow.tags = self
            .tag_repository
            .list_tags_for_cow(ranch_id, cow_id)
            .map_err(DomainError::from_store)?;
        cow.notes = self
            .note_repository
            .list_notes_for_cow(ranch_id, cow_id)
            .map_err(DomainError::from_store)?;
        cow.medical = self
            .medical_repository
            .list_issues_for_cow(ranch_id, cow_id)
            .map_err(DomainError::from_store)?;

        Ok(cow)
    }

    /// Fetch the whole herd, creation-descending, aggregates assembled.
    pub fn list_cows(&self, ranch_id: &str) -> DomainResult<Vec<Cow>> {
        let mut cows = self
            .cow_repository
            .list_cows(ranch_id)
            .map_err(DomainError::from_store)?;

        let mut tags_by_cow: HashMap<String, Vec<Tag>> = HashMap::new();
        for row in self
            .tag_repository
            .list_tags(ranch_id)
            .map_err(DomainError::from_store)?
        {
            tags_by_cow.entry(row.cow_id).or_default().push(row.tag);
        }

        let mut notes_by_cow: HashMap<String, Vec<Note>> = HashMap::new();
        for row in self
            .note_repository
            .list_notes(ranch_id)
            .map_err(DomainError::from_store)?
        {
            notes_by_cow.entry(row.cow_id).or_default().push(row.note);
        }

        let mut medical_by_cow: HashMap<String, Vec<MedicalIssue>> = HashMap::new();
        for row in self
            .medical_repository
            .list_issues(ranch_id)
            .map_err(DomainError::from_store)?
        {
            medical_by_cow.entry(row.cow_id).or_default().push(row.issue);
        }

        for cow in &mut cows {
            cow.tags = tags_by_cow.remove(&cow.id).unwrap_or_default();
            cow.notes = notes_by_cow.remove(&cow.id).unwrap_or_default();
            cow.medical = medical_by_cow.remove(&cow.id).unwrap_or_default();
        }

        Ok(cows)
    }

    /// Append a note; notes are never edited or deleted from here.
    pub fn add_note(&self, command: AddNoteCommand) -> DomainResult<Note> {
        let text = command.text.trim().to_string();
        if text.is_empty() {
            return Err(DomainError::Validation("note text cannot be empty".to_string()));
        }

        let mut cow = self
            .cow_repository
            .get_cow(&command.ranch_id, &command.cow_id)
            .map_err(DomainError::from_store)?
            .ok_or_else(|| DomainError::NotFound(format!("cow {}", command.cow_id)))?;

        let note = Note {
            id: Uuid::new_v4().to_string(),
            text,
            created_at: Utc::now(),
        };
        self.note_repository
            .append_note(&command.ranch_id, &command.cow_id, &note)
            .map_err(DomainError::from_store)?;

        cow.updated_at = Utc::now();
        self.cow_repository
            .update_cow(&command.ranch_id, &cow)
            .map_err(DomainError::from_store)?;

        info!("Added note to cow {}", command.cow_id);
        Ok(note)
    }

    /// Record a medical issue; a previously unseen label is added to
    /// the ranch's reusable suggestion list.
    pub fn add_medical_issue(
        &self,
        command: AddMedicalIssueCommand,
    ) -> DomainResult<MedicalIssue> {
        let label = command.label.trim().to_string();
        if label.is_empty() {
            return Err(DomainError::Validation(
                "medical issue label cannot be empty".to_string(),
            ));
        }

        let mut cow = self
            .cow_repository
            .get_cow(&command.ranch_id, &command.cow_id)
            .map_err(DomainError::from_store)?
            .ok_or_else(|| DomainError::NotFound(format!("cow {}", command.cow_id)))?;

        let issue = MedicalIssue {
            id: Uuid::new_v4().to_string(),
            label: label.clone(),
            created_at: Utc::now(),
        };
        self.medical_repository
            .record_issue(&command.ranch_id, &command.cow_id, &issue)
            .map_err(DomainError::from_store)?;

        if self
            .preset_repository
            .add_medical_preset(&command.ranch_id, &label)
            .map_err(DomainError::from_store)?
        {
            debug!("Added new medical preset '{}'", label);
        }

        cow.updated_at = Utc::now();
        self.cow_repository
            .update_cow(&command.ranch_id, &cow)
            .map_err(DomainError::from_store)?;

        info!("Recorded medical issue on cow {}", command.cow_id);
        Ok(issue)
    }

    /// Herd search. A query of the exact form `MM/YYYY-MM/YYYY` filters
    /// by birth range; anything else is free text merged with
    /// medical-label matches, text hits first.
    pub fn search(&self, command: SearchCommand) -> DomainResult<SearchResult> {
        debug!("Searching ranch {} for '{}'", command.ranch_id, command.query);

        let cows = self.list_cows(&command.ranch_id)?;
        let query = command.query.trim();

        let mut results = if let Some((from, to)) = search::parse_date_range(query) {
            cows.into_iter()
                .filter(|cow| search::matches_birth_range(cow, from, to))
                .collect()
        } else if query.is_empty() {
            cows
        } else {
            let pastures = self
                .pasture_repository
                .list_pastures(&command.ranch_id)
                .map_err(DomainError::from_store)?;
            let herd = cows.clone();
            let text_matches = search::text_search(query, cows, &pastures);
            let medical_ids = self
                .medical_repository
                .search_labels(&command.ranch_id, query)
                .map_err(DomainError::from_store)?;
            search::merge_medical_matches(text_matches, &medical_ids, &herd)
        };

        if let Some(key) = command.sort {
            search::sort_cows(&mut results, key);
        }

        Ok(SearchResult { cows: results })
    }

    /// The cow currently holding a tag number, if any.
    pub fn resolve_by_tag(&self, ranch_id: &str, number: &str) -> DomainResult<Option<Cow>> {
        let rows = self
            .tag_repository
            .list_tags(ranch_id)
            .map_err(DomainError::from_store)?;
        let index = TagIndex::build(&rows);

        match index.resolve(number) {
            Some(cow_id) => {
                let cow_id = cow_id.to_string();
                Ok(Some(self.get_cow(ranch_id, &cow_id)?))
            }
            None => Ok(None),
        }
    }

    /// Cows whose stored mother tag matches one of this cow's numbers.
    pub fn resolve_calves(&self, ranch_id: &str, cow_id: &str) -> DomainResult<Vec<Cow>> {
        let herd = self.list_cows(ranch_id)?;
        let cow = herd
            .iter()
            .find(|c| c.id == cow_id)
            .ok_or_else(|| DomainError::NotFound(format!("cow {}", cow_id)))?;

        Ok(calves_of(cow, &herd).into_iter().cloned().collect())
    }
}

/// Trim numbers and drop blank drafts; a blank number is "remove this
/// tag" from the editing form's point of view.
fn normalize_drafts(drafts: &[TagDraft]) -> Vec<TagDraft> {
    drafts
        .iter()
        .map(|draft| TagDraft {
            label: draft.label,
            number: draft.number.trim().to_string(),
        })
        .filter(|draft| !draft.number.is_empty())
        .collect()
}

/// A number repeated within one request is caught locally, before any
/// store call.
fn validate_drafts(drafts: &[TagDraft]) -> DomainResult<()> {
    let mut seen = HashSet::new();
    for draft in drafts {
        if !seen.insert(draft.number.as_str()) {
            return Err(DomainError::Validation(format!(
                "duplicate tag number '{}' in request",
                draft.number
            )));
        }
    }
    Ok(())
}

fn validate_birth_fields(month: Option<u32>, year: Option<i32>) -> DomainResult<()> {
    if let Some(month) = month {
        if !(1..=12).contains(&month) {
            return Err(DomainError::Validation(
                "birth month must be between 1 and 12".to_string(),
            ));
        }
    }
    if let Some(year) = year {
        if !(1900..=2100).contains(&year) {
            return Err(DomainError::Validation(
                "birth year must be between 1900 and 2100".to_string(),
            ));
        }
    }
    Ok(())
}

fn drafts_to_tags(drafts: &[TagDraft]) -> Vec<Tag> {
    drafts
        .iter()
        .map(|draft| Tag {
            id: Uuid::new_v4().to_string(),
            label: draft.label,
            number: draft.number.clone(),
        })
        .collect()
}
