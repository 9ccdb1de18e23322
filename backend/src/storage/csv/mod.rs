//! # CSV/YAML Storage Module
//!
//! File-backed implementation of the storage traits: the stand-in for
//! the hosted relational store. Each ranch owns a directory with YAML
//! entity documents (ranch, cows) and CSV row files (tags, notes,
//! medical issues, members, pastures, presets). Writes are atomic via
//! temp-file-then-rename; the tag file carries the ranch-wide
//! unique-number constraint.

pub mod connection;
pub mod cow_repository;
pub mod medical_repository;
pub mod member_repository;
pub mod note_repository;
pub mod pasture_repository;
pub mod preset_repository;
pub mod ranch_repository;
pub mod tag_repository;

#[cfg(test)]
pub mod test_utils;

pub use connection::CsvConnection;
pub use cow_repository::CowRepository;
pub use medical_repository::MedicalRepository;
pub use member_repository::MemberRepository;
pub use note_repository::NoteRepository;
pub use pasture_repository::PastureRepository;
pub use preset_repository::PresetRepository;
pub use ranch_repository::RanchRepository;
pub use tag_repository::TagRepository;
