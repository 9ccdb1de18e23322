use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

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

impl CowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CowStatus::Wet => "wet",
            CowStatus::Dry => "dry",
            CowStatus::Bred => "bred",
            CowStatus::Bull => "bull",
            CowStatus::Steer => "steer",
            CowStatus::Cull => "cull",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "wet" => Some(CowStatus::Wet),
            "dry" => Some(CowStatus::Dry),
            "bred" => Some(CowStatus::Bred),
            "bull" => Some(CowStatus::Bull),
            "steer" => Some(CowStatus::Steer),
            "cull" => Some(CowStatus::Cull),
            _ => None,
        }
    }
}

/// Kind of physical identifier a tag represents.
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

impl TagLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            TagLabel::EarTag => "ear tag",
            TagLabel::Rfid => "RFID",
            TagLabel::Brand => "brand",
            TagLabel::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ear tag" => Some(TagLabel::EarTag),
            "RFID" => Some(TagLabel::Rfid),
            "brand" => Some(TagLabel::Brand),
            "other" => Some(TagLabel::Other),
            _ => None,
        }
    }
}

/// A physical identifier attached to a cow. Numbers are stored trimmed
/// and compared case-sensitively; within a ranch a number is unique
/// across all tags of all cows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub label: TagLabel,
    pub number: String,
}

/// Reference to another cow by one of its tag numbers. Deliberately not
/// a foreign key: resolution happens at read time against the ranch's
/// live tag set, and re-tagging the referenced cow leaves this dangling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MotherTag(String);

impl MotherTag {
    pub fn new(number: impl Into<String>) -> Self {
        let number: String = number.into();
        MotherTag(number.trim().to_string())
    }

    pub fn number(&self) -> &str {
        &self.0
    }
}

/// Free-text note on a cow; append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// A recorded medical issue on a cow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalIssue {
    pub id: String,
    pub label: String,
    pub created_at: DateTime<Utc>,
}

/// Domain model for an animal record. Tags, notes, and medical issues
/// are owned by the cow (composition); the storage layer keeps them as
/// separate rows and the herd service assembles the aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cow {
    pub id: String,
    pub ranch_id: String,
    pub description: Option<String>,
    pub status: CowStatus,
    pub breed: Option<String>,
    pub birth_month: Option<u32>,
    pub birth_year: Option<i32>,
    pub pasture_id: Option<String>,
    pub photos: Vec<String>,
    pub mother_tag: Option<MotherTag>,
    pub tags: Vec<Tag>,
    pub notes: Vec<Note>,
    pub medical: Vec<MedicalIssue>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cow {
    /// The display tag: first in the ordered tag list.
    pub fn primary_tag(&self) -> Option<&Tag> {
        self.tags.first()
    }

    pub fn tag_numbers(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(|t| t.number.as_str())
    }

    /// Birth month/year encoded as `year*100 + month` for range
    /// comparison; None when either field is missing.
    pub fn birth_key(&self) -> Option<i32> {
        match (self.birth_month, self.birth_year) {
            (Some(month), Some(year)) => Some(year * 100 + month as i32),
            _ => None,
        }
    }
}
