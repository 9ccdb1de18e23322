use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::{
    CowRepository, MedicalRepository, NoteRepository, PresetRepository, TagRepository,
};
use crate::storage::traits::Connection;

pub const TAGS_HEADER: &[&str] = &["id", "cow_id", "label", "number"];
pub const NOTES_HEADER: &[&str] = &["id", "cow_id", "text", "created_at"];
pub const MEDICAL_HEADER: &[&str] = &["id", "cow_id", "label", "created_at"];
pub const MEMBERS_HEADER: &[&str] = &["id", "email", "role", "accepted", "user_id", "created_at"];
pub const PASTURES_HEADER: &[&str] = &["id", "name", "created_at"];
pub const PRESETS_HEADER: &[&str] = &["label"];

/// CsvConnection manages the data directory and the per-ranch file
/// layout beneath it:
///
/// ```text
/// <base>/<ranch_id>/ranch.yaml
///                   cows/<cow_id>.yaml
///                   tags.csv
///                   notes.csv
///                   medical.csv
///                   members.csv
///                   pastures.csv
///                   breeds.csv
///                   medical_presets.csv
/// ```
#[derive(Clone)]
pub struct CsvConnection {
    base_directory: Arc<Mutex<PathBuf>>,
}

impl CsvConnection {
    /// Create a new connection rooted at a base directory, creating it
    /// if needed.
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)?;
        }

        Ok(Self {
            base_directory: Arc::new(Mutex::new(base_path)),
        })
    }

    pub fn base_directory(&self) -> PathBuf {
        let base_dir = self.base_directory.lock().unwrap();
        base_dir.clone()
    }

    pub fn ranch_directory(&self, ranch_id: &str) -> PathBuf {
        self.base_directory().join(ranch_id)
    }

    pub fn ranch_file(&self, ranch_id: &str) -> PathBuf {
        self.ranch_directory(ranch_id).join("ranch.yaml")
    }

    pub fn cows_directory(&self, ranch_id: &str) -> PathBuf {
        self.ranch_directory(ranch_id).join("cows")
    }

    pub fn cow_file(&self, ranch_id: &str, cow_id: &str) -> PathBuf {
        self.cows_directory(ranch_id).join(format!("{}.yaml", cow_id))
    }

    pub fn tags_file(&self, ranch_id: &str) -> PathBuf {
        self.ranch_directory(ranch_id).join("tags.csv")
    }

    pub fn notes_file(&self, ranch_id: &str) -> PathBuf {
        self.ranch_directory(ranch_id).join("notes.csv")
    }

    pub fn medical_file(&self, ranch_id: &str) -> PathBuf {
        self.ranch_directory(ranch_id).join("medical.csv")
    }

    pub fn members_file(&self, ranch_id: &str) -> PathBuf {
        self.ranch_directory(ranch_id).join("members.csv")
    }

    pub fn pastures_file(&self, ranch_id: &str) -> PathBuf {
        self.ranch_directory(ranch_id).join("pastures.csv")
    }

    pub fn breeds_file(&self, ranch_id: &str) -> PathBuf {
        self.ranch_directory(ranch_id).join("breeds.csv")
    }

    pub fn medical_presets_file(&self, ranch_id: &str) -> PathBuf {
        self.ranch_directory(ranch_id).join("medical_presets.csv")
    }

    /// Make sure a ranch's directory and row files exist with headers.
    pub fn ensure_ranch_layout(&self, ranch_id: &str) -> Result<()> {
        let ranch_dir = self.ranch_directory(ranch_id);
        fs::create_dir_all(self.cows_directory(ranch_id))?;

        let files: [(PathBuf, &[&str]); 7] = [
            (ranch_dir.join("tags.csv"), TAGS_HEADER),
            (ranch_dir.join("notes.csv"), NOTES_HEADER),
            (ranch_dir.join("medical.csv"), MEDICAL_HEADER),
            (ranch_dir.join("members.csv"), MEMBERS_HEADER),
            (ranch_dir.join("pastures.csv"), PASTURES_HEADER),
            (ranch_dir.join("breeds.csv"), PRESETS_HEADER),
            (ranch_dir.join("medical_presets.csv"), PRESETS_HEADER),
        ];
        for (path, header) in &files {
            ensure_csv_file(path, header)?;
        }

        Ok(())
    }
}

/// Create a CSV file with just its header if it does not exist yet.
pub(crate) fn ensure_csv_file(path: &Path, header: &[&str]) -> Result<()> {
    if !path.exists() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut line = header.join(",");
        line.push('\n');
        fs::write(path, line)?;
    }
    Ok(())
}

/// Atomic write using a temp file and rename, so readers never observe
/// a half-written file.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, contents)?;
    fs::rename(&temp_path, path)?;
    Ok(())
}

impl Connection for CsvConnection {
    type Cows = CowRepository;
    type Tags = TagRepository;
    type Notes = NoteRepository;
    type Medical = MedicalRepository;
    type Presets = PresetRepository;

    fn create_cow_repository(&self) -> CowRepository {
        CowRepository::new(Arc::new(self.clone()))
    }

    fn create_tag_repository(&self) -> TagRepository {
        TagRepository::new(Arc::new(self.clone()))
    }

    fn create_note_repository(&self) -> NoteRepository {
        NoteRepository::new(Arc::new(self.clone()))
    }

    fn create_medical_repository(&self) -> MedicalRepository {
        MedicalRepository::new(Arc::new(self.clone()))
    }

    fn create_preset_repository(&self) -> PresetRepository {
        PresetRepository::new(Arc::new(self.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn ensure_ranch_layout_creates_row_files() {
        let temp_dir = TempDir::new().unwrap();
        let connection = CsvConnection::new(temp_dir.path()).unwrap();

        connection.ensure_ranch_layout("ranch-1").unwrap();

        assert!(connection.cows_directory("ranch-1").is_dir());
        assert!(connection.tags_file("ranch-1").exists());
        assert!(connection.members_file("ranch-1").exists());
        let header = fs::read_to_string(connection.tags_file("ranch-1")).unwrap();
        assert_eq!(header.lines().next(), Some("id,cow_id,label,number"));
    }

    #[test]
    fn write_atomic_replaces_contents() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ranch.yaml");

        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        assert!(!path.with_extension("tmp").exists());
    }
}
