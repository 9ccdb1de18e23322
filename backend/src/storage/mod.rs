pub mod csv;
pub mod traits;

pub use traits::{
    Connection, CowStorage, MedicalStorage, MemberStorage, NoteStorage, PastureStorage,
    PresetStorage, RanchStorage, TagConflict, TagStorage,
};
