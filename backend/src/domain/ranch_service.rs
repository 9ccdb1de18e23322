use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::commands::ranches::{
    AddPastureCommand, AddPastureResult, CreateRanchCommand, CreateRanchResult,
    DeleteRanchCommand, DeleteRanchResult,
};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::models::billing::RanchBilling;
use crate::domain::models::member::{Member, Role};
use crate::domain::models::ranch::{Pasture, Ranch};
use crate::storage::csv::{CsvConnection, MemberRepository, PastureRepository, PresetRepository, RanchRepository};
use crate::storage::{MemberStorage, PastureStorage, PresetStorage, RanchStorage};

/// Service for ranch lifecycle, pastures, and the ranch-scoped preset
/// lists. Creating a ranch makes the creator its sole accepted manager;
/// deleting one is owner-only and cascades through the store.
#[derive(Clone)]
pub struct RanchService {
    ranch_repository: RanchRepository,
    member_repository: MemberRepository,
    pasture_repository: PastureRepository,
    preset_repository: PresetRepository,
}

impl RanchService {
    pub fn new(csv_conn: Arc<CsvConnection>) -> Self {
        Self {
            ranch_repository: RanchRepository::new(csv_conn.clone()),
            member_repository: MemberRepository::new(csv_conn.clone()),
            pasture_repository: PastureRepository::new(csv_conn.clone()),
            preset_repository: PresetRepository::new(csv_conn),
        }
    }

    pub fn create_ranch(&self, command: CreateRanchCommand) -> DomainResult<CreateRanchResult> {
        info!("Creating ranch '{}'", command.name);

        let name = command.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::Validation("ranch name cannot be empty".to_string()));
        }
        if name.len() > 100 {
            return Err(DomainError::Validation(
                "ranch name cannot exceed 100 characters".to_string(),
            ));
        }

        let now = Utc::now();
        let ranch = Ranch {
            id: Uuid::new_v4().to_string(),
            name,
            owner_user_id: command.owner_user_id.clone(),
            billing: RanchBilling::free(),
            created_at: now,
        };
        self.ranch_repository
            .store_ranch(&ranch)
            .map_err(DomainError::from_store)?;

        // The creator is the sole manager from the start, already
        // accepted and bound to their identity.
        let owner_member = Member {
            id: Uuid::new_v4().to_string(),
            ranch_id: ranch.id.clone(),
            email: command.owner_email.trim().to_lowercase(),
            role: Role::Manager,
            accepted: true,
            user_id: Some(command.owner_user_id),
            created_at: now,
        };
        self.member_repository
            .store_member(&ranch.id, &owner_member)
            .map_err(DomainError::from_store)?;

        info!("Created ranch {} ('{}')", ranch.id, ranch.name);
        Ok(CreateRanchResult { ranch })
    }

    pub fn get_ranch(&self, ranch_id: &str) -> DomainResult<Ranch> {
        self.ranch_repository
            .get_ranch(ranch_id)
            .map_err(DomainError::from_store)?
            .ok_or_else(|| DomainError::NotFound(format!("ranch {}", ranch_id)))
    }

    /// Ranches where the user is an accepted member.
    pub fn list_ranches_for_user(&self, user_id: &str) -> DomainResult<Vec<Ranch>> {
        let ranches = self
            .ranch_repository
            .list_ranches()
            .map_err(DomainError::from_store)?;

        let mut visible = Vec::new();
        for ranch in ranches {
            let members = self
                .member_repository
                .list_members(&ranch.id)
                .map_err(DomainError::from_store)?;
            if members
                .iter()
                .any(|m| m.accepted && m.user_id.as_deref() == Some(user_id))
            {
                visible.push(ranch);
            }
        }

        Ok(visible)
    }

    /// Delete a ranch and everything beneath it. Owner only.
    pub fn delete_ranch(&self, command: DeleteRanchCommand) -> DomainResult<DeleteRanchResult> {
        let ranch = self.get_ranch(&command.ranch_id)?;

        if ranch.owner_user_id != command.acting_user_id {
            warn!(
                "User {} attempted to delete ranch {} they do not own",
                command.acting_user_id, command.ranch_id
            );
            return Err(DomainError::Authorization(
                "only the ranch owner can delete the ranch".to_string(),
            ));
        }

        self.ranch_repository
            .delete_ranch(&command.ranch_id)
            .map_err(DomainError::from_store)?;

        info!("Deleted ranch {} ('{}')", ranch.id, ranch.name);
        Ok(DeleteRanchResult {
            success_message: format!("Ranch '{}' deleted successfully", ranch.name),
        })
    }

    pub fn add_pasture(&self, command: AddPastureCommand) -> DomainResult<AddPastureResult> {
        let name = command.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::Validation("pasture name cannot be empty".to_string()));
        }

        // Make sure the ranch exists before hanging rows off it.
        self.get_ranch(&command.ranch_id)?;

        let pasture = Pasture {
            id: Uuid::new_v4().to_string(),
            name,
            created_at: Utc::now(),
        };
        self.pasture_repository
            .store_pasture(&command.ranch_id, &pasture)
            .map_err(DomainError::from_store)?;

        info!("Added pasture '{}' to ranch {}", pasture.name, command.ranch_id);
        Ok(AddPastureResult { pasture })
    }

    pub fn list_pastures(&self, ranch_id: &str) -> DomainResult<Vec<Pasture>> {
        self.pasture_repository
            .list_pastures(ranch_id)
            .map_err(DomainError::from_store)
    }

    /// Cows referencing the pasture keep their dangling id; the read
    /// side treats it as unassigned.
    pub fn delete_pasture(&self, ranch_id: &str, pasture_id: &str) -> DomainResult<()> {
        self.pasture_repository
            .delete_pasture(ranch_id, pasture_id)
            .map_err(DomainError::from_store)
    }

    pub fn list_breeds(&self, ranch_id: &str) -> DomainResult<Vec<String>> {
        self.preset_repository
            .list_breeds(ranch_id)
            .map_err(DomainError::from_store)
    }

    pub fn list_medical_presets(&self, ranch_id: &str) -> DomainResult<Vec<String>> {
        self.preset_repository
            .list_medical_presets(ranch_id)
            .map_err(DomainError::from_store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::csv::test_utils::test_connection;
    use tempfile::TempDir;

    fn setup() -> (RanchService, Arc<CsvConnection>, TempDir) {
        let (connection, temp_dir) = test_connection();
        let conn = Arc::new(connection);
        (RanchService::new(conn.clone()), conn, temp_dir)
    }

    fn create(service: &RanchService, name: &str, owner: &str) -> Ranch {
        service
            .create_ranch(CreateRanchCommand {
                name: name.to_string(),
                owner_user_id: owner.to_string(),
                owner_email: format!("{}@ranch.example", owner),
            })
            .unwrap()
            .ranch
    }

    #[test]
    fn create_ranch_makes_creator_sole_manager() {
        let (service, conn, _temp_dir) = setup();

        let ranch = create(&service, "  Bar W  ", "user-1");
        assert_eq!(ranch.name, "Bar W");

        let members = MemberRepository::new(conn.clone())
            .list_members(&ranch.id)
            .unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].role, Role::Manager);
        assert!(members[0].accepted);
        assert_eq!(members[0].user_id.as_deref(), Some("user-1"));
    }

    #[test]
    fn create_ranch_validates_name() {
        let (service, _conn, _temp_dir) = setup();

        let err = service
            .create_ranch(CreateRanchCommand {
                name: "   ".to_string(),
                owner_user_id: "user-1".to_string(),
                owner_email: "u@x.example".to_string(),
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn list_ranches_for_user_filters_by_membership() {
        let (service, _conn, _temp_dir) = setup();

        create(&service, "Bar W", "user-1");
        create(&service, "Antler Creek", "user-2");

        let mine = service.list_ranches_for_user("user-1").unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].name, "Bar W");

        assert!(service.list_ranches_for_user("user-9").unwrap().is_empty());
    }

    #[test]
    fn delete_ranch_is_owner_only_and_cascades() {
        let (service, conn, _temp_dir) = setup();

        let ranch = create(&service, "Bar W", "user-1");
        service
            .add_pasture(AddPastureCommand {
                ranch_id: ranch.id.clone(),
                name: "North Forty".to_string(),
            })
            .unwrap();

        let err = service
            .delete_ranch(DeleteRanchCommand {
                ranch_id: ranch.id.clone(),
                acting_user_id: "user-2".to_string(),
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::Authorization(_)));

        service
            .delete_ranch(DeleteRanchCommand {
                ranch_id: ranch.id.clone(),
                acting_user_id: "user-1".to_string(),
            })
            .unwrap();

        // Everything under the ranch directory is gone.
        assert!(!conn.ranch_directory(&ranch.id).exists());
        assert!(service.list_pastures(&ranch.id).unwrap().is_empty());
        assert!(matches!(
            service.get_ranch(&ranch.id).unwrap_err(),
            DomainError::NotFound(_)
        ));
    }

    #[test]
    fn pastures_add_list_delete() {
        let (service, _conn, _temp_dir) = setup();

        let ranch = create(&service, "Bar W", "user-1");
        let added = service
            .add_pasture(AddPastureCommand {
                ranch_id: ranch.id.clone(),
                name: "  South Draw ".to_string(),
            })
            .unwrap();
        assert_eq!(added.pasture.name, "South Draw");

        let err = service
            .add_pasture(AddPastureCommand {
                ranch_id: ranch.id.clone(),
                name: " ".to_string(),
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        service.delete_pasture(&ranch.id, &added.pasture.id).unwrap();
        assert!(service.list_pastures(&ranch.id).unwrap().is_empty());
    }
}
