use crate::domain::commands::herd::{CreateCowCommand, TagDraft, UpdateCowCommand};
use crate::domain::models::cow::{
    Cow as DomainCow, CowStatus as DomainCowStatus, MedicalIssue as DomainMedicalIssue,
    Note as DomainNote, Tag as DomainTag, TagLabel as DomainTagLabel,
};
use shared::{
    Cow as SharedCow, CowStatus as SharedCowStatus, CreateCowRequest, MedicalIssue, CowNote,
    Tag as SharedTag, TagInput, TagLabel as SharedTagLabel, UpdateCowRequest,
};

/// Mapper to convert between shared cow DTOs and domain cow models.
pub struct CowMapper;

impl CowMapper {
    pub fn status_to_domain(status: SharedCowStatus) -> DomainCowStatus {
        match status {
            SharedCowStatus::Wet => DomainCowStatus::Wet,
            SharedCowStatus::Dry => DomainCowStatus::Dry,
            SharedCowStatus::Bred => DomainCowStatus::Bred,
            SharedCowStatus::Bull => DomainCowStatus::Bull,
            SharedCowStatus::Steer => DomainCowStatus::Steer,
            SharedCowStatus::Cull => DomainCowStatus::Cull,
        }
    }

    pub fn status_to_dto(status: DomainCowStatus) -> SharedCowStatus {
        match status {
            DomainCowStatus::Wet => SharedCowStatus::Wet,
            DomainCowStatus::Dry => SharedCowStatus::Dry,
            DomainCowStatus::Bred => SharedCowStatus::Bred,
            DomainCowStatus::Bull => SharedCowStatus::Bull,
            DomainCowStatus::Steer => SharedCowStatus::Steer,
            DomainCowStatus::Cull => SharedCowStatus::Cull,
        }
    }

    pub fn label_to_domain(label: SharedTagLabel) -> DomainTagLabel {
        match label {
            SharedTagLabel::EarTag => DomainTagLabel::EarTag,
            SharedTagLabel::Rfid => DomainTagLabel::Rfid,
            SharedTagLabel::Brand => DomainTagLabel::Brand,
            SharedTagLabel::Other => DomainTagLabel::Other,
        }
    }

    pub fn label_to_dto(label: DomainTagLabel) -> SharedTagLabel {
        match label {
            DomainTagLabel::EarTag => SharedTagLabel::EarTag,
            DomainTagLabel::Rfid => SharedTagLabel::Rfid,
            DomainTagLabel::Brand => SharedTagLabel::Brand,
            DomainTagLabel::Other => SharedTagLabel::Other,
        }
    }

    fn tag_input_to_draft(input: TagInput) -> TagDraft {
        TagDraft {
            label: Self::label_to_domain(input.label),
            number: input.number,
        }
    }

    pub fn to_create_command(ranch_id: String, request: CreateCowRequest) -> CreateCowCommand {
        CreateCowCommand {
            ranch_id,
            description: request.description,
            status: Self::status_to_domain(request.status),
            breed: request.breed,
            birth_month: request.birth_month,
            birth_year: request.birth_year,
            pasture_id: request.pasture_id,
            photos: request.photos,
            mother_tag: request.mother_tag,
            tags: request
                .tags
                .into_iter()
                .map(Self::tag_input_to_draft)
                .collect(),
        }
    }

    pub fn to_update_command(
        ranch_id: String,
        cow_id: String,
        request: UpdateCowRequest,
    ) -> UpdateCowCommand {
        UpdateCowCommand {
            ranch_id,
            cow_id,
            description: request.description,
            status: request.status.map(Self::status_to_domain),
            breed: request.breed,
            birth_month: request.birth_month,
            birth_year: request.birth_year,
            pasture_id: request.pasture_id,
            photos: request.photos,
            mother_tag: request.mother_tag,
            tags: request
                .tags
                .map(|tags| tags.into_iter().map(Self::tag_input_to_draft).collect()),
        }
    }

    pub fn tag_to_dto(tag: DomainTag) -> SharedTag {
        SharedTag {
            id: tag.id,
            label: Self::label_to_dto(tag.label),
            number: tag.number,
        }
    }

    pub fn note_to_dto(note: DomainNote) -> CowNote {
        CowNote {
            id: note.id,
            text: note.text,
            created_at: note.created_at.to_rfc3339(),
        }
    }

    pub fn medical_to_dto(issue: DomainMedicalIssue) -> MedicalIssue {
        MedicalIssue {
            id: issue.id,
            label: issue.label,
            created_at: issue.created_at.to_rfc3339(),
        }
    }

    pub fn to_dto(cow: DomainCow) -> SharedCow {
        SharedCow {
            id: cow.id,
            ranch_id: cow.ranch_id,
            description: cow.description,
            status: Self::status_to_dto(cow.status),
            breed: cow.breed,
            birth_month: cow.birth_month,
            birth_year: cow.birth_year,
            pasture_id: cow.pasture_id,
            photos: cow.photos,
            mother_tag: cow.mother_tag.map(|m| m.number().to_string()),
            tags: cow.tags.into_iter().map(Self::tag_to_dto).collect(),
            notes: cow.notes.into_iter().map(Self::note_to_dto).collect(),
            medical: cow.medical.into_iter().map(Self::medical_to_dto).collect(),
            created_at: cow.created_at.to_rfc3339(),
            updated_at: cow.updated_at.to_rfc3339(),
        }
    }

    pub fn to_cow_list_dto(cows: Vec<DomainCow>) -> shared::CowListResponse {
        shared::CowListResponse {
            cows: cows.into_iter().map(Self::to_dto).collect(),
        }
    }
}
