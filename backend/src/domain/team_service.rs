use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::commands::team::{
    AcceptInviteCommand, AcceptInviteResult, ChangeRoleCommand, ChangeRoleResult,
    InviteMemberCommand, InviteMemberResult, RemoveMemberCommand, RemoveMemberResult,
    TransferOwnershipCommand, TransferOwnershipResult,
};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::models::member::{Member, Role};
use crate::storage::csv::{CsvConnection, MemberRepository, RanchRepository};
use crate::storage::{MemberStorage, RanchStorage};

/// Service for team management: invites, acceptance, role changes,
/// removal, and ownership transfer. Mutations require the acting user
/// to be a manager, and no operation may leave a ranch without one.
#[derive(Clone)]
pub struct TeamService {
    member_repository: MemberRepository,
    ranch_repository: RanchRepository,
}

impl TeamService {
    pub fn new(csv_conn: Arc<CsvConnection>) -> Self {
        Self {
            member_repository: MemberRepository::new(csv_conn.clone()),
            ranch_repository: RanchRepository::new(csv_conn),
        }
    }

    pub fn list_members(&self, ranch_id: &str) -> DomainResult<Vec<Member>> {
        self.member_repository
            .list_members(ranch_id)
            .map_err(DomainError::from_store)
    }

    /// The acting user's role in the ranch, if they are an accepted
    /// member.
    pub fn role_for_user(&self, ranch_id: &str, user_id: &str) -> DomainResult<Option<Role>> {
        Ok(self
            .list_members(ranch_id)?
            .into_iter()
            .find(|m| m.accepted && m.user_id.as_deref() == Some(user_id))
            .map(|m| m.role))
    }

    /// Invite a new member by email, in a pending state until the email
    /// signs in and accepts. Invites are created as read or write only.
    pub fn invite_member(&self, command: InviteMemberCommand) -> DomainResult<InviteMemberResult> {
        info!(
            "Inviting {} to ranch {} as {}",
            command.email,
            command.ranch_id,
            command.role.as_str()
        );

        self.require_manager(&command.ranch_id, &command.acting_user_id)?;

        let email = command.email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(DomainError::Validation("a valid email is required".to_string()));
        }
        if command.role == Role::Manager {
            return Err(DomainError::Validation(
                "invite members as read or write; promote to manager after they accept"
                    .to_string(),
            ));
        }

        let members = self.list_members(&command.ranch_id)?;
        if members.iter().any(|m| m.email.eq_ignore_ascii_case(&email)) {
            return Err(DomainError::Validation(format!(
                "{} is already a member of this ranch",
                email
            )));
        }

        let member = Member {
            id: Uuid::new_v4().to_string(),
            ranch_id: command.ranch_id.clone(),
            email,
            role: command.role,
            accepted: false,
            user_id: None,
            created_at: Utc::now(),
        };
        self.member_repository
            .store_member(&command.ranch_id, &member)
            .map_err(DomainError::from_store)?;

        info!("Invited member {} to ranch {}", member.id, command.ranch_id);
        Ok(InviteMemberResult { member })
    }

    /// Bind a user identity to a pending invite once the invited email
    /// signs in.
    pub fn accept_invite(&self, command: AcceptInviteCommand) -> DomainResult<AcceptInviteResult> {
        let email = command.email.trim().to_lowercase();

        let mut member = self
            .list_members(&command.ranch_id)?
            .into_iter()
            .find(|m| !m.accepted && m.email.eq_ignore_ascii_case(&email))
            .ok_or_else(|| DomainError::NotFound(format!("invite for {}", email)))?;

        member.accepted = true;
        member.user_id = Some(command.user_id);
        self.member_repository
            .update_member(&command.ranch_id, &member)
            .map_err(DomainError::from_store)?;

        info!("Member {} accepted invite to ranch {}", member.id, command.ranch_id);
        Ok(AcceptInviteResult { member })
    }

    /// Change a member's role. Demoting the last manager is rejected
    /// before any write.
    pub fn change_role(&self, command: ChangeRoleCommand) -> DomainResult<ChangeRoleResult> {
        self.require_manager(&command.ranch_id, &command.acting_user_id)?;

        let mut member = self
            .member_repository
            .get_member(&command.ranch_id, &command.member_id)
            .map_err(DomainError::from_store)?
            .ok_or_else(|| DomainError::NotFound(format!("member {}", command.member_id)))?;

        if member.role == command.new_role {
            return Ok(ChangeRoleResult { member });
        }

        if member.role == Role::Manager && self.manager_count(&command.ranch_id)? <= 1 {
            warn!(
                "Refusing to demote the last manager of ranch {}",
                command.ranch_id
            );
            return Err(DomainError::LastManager);
        }

        member.role = command.new_role;
        self.member_repository
            .update_member(&command.ranch_id, &member)
            .map_err(DomainError::from_store)?;

        info!(
            "Changed role of member {} in ranch {} to {}",
            member.id,
            command.ranch_id,
            member.role.as_str()
        );
        Ok(ChangeRoleResult { member })
    }

    /// Remove a member. Removing the last manager is rejected before
    /// any write.
    pub fn remove_member(&self, command: RemoveMemberCommand) -> DomainResult<RemoveMemberResult> {
        self.require_manager(&command.ranch_id, &command.acting_user_id)?;

        let member = self
            .member_repository
            .get_member(&command.ranch_id, &command.member_id)
            .map_err(DomainError::from_store)?
            .ok_or_else(|| DomainError::NotFound(format!("member {}", command.member_id)))?;

        if member.role == Role::Manager && self.manager_count(&command.ranch_id)? <= 1 {
            warn!(
                "Refusing to remove the last manager of ranch {}",
                command.ranch_id
            );
            return Err(DomainError::LastManager);
        }

        self.member_repository
            .delete_member(&command.ranch_id, &command.member_id)
            .map_err(DomainError::from_store)?;

        info!("Removed member {} from ranch {}", member.id, command.ranch_id);
        Ok(RemoveMemberResult {
            success_message: format!("{} removed from the ranch", member.email),
        })
    }

    /// Transfer the ranch to another member: the target is promoted to
    /// manager, the ranch's owner reference is reassigned, and the
    /// previous owner is demoted to write. Promotion happens first so
    /// the ranch never passes through a zero-manager state.
    pub fn transfer_ownership(
        &self,
        command: TransferOwnershipCommand,
    ) -> DomainResult<TransferOwnershipResult> {
        self.require_manager(&command.ranch_id, &command.acting_user_id)?;

        let mut ranch = self
            .ranch_repository
            .get_ranch(&command.ranch_id)
            .map_err(DomainError::from_store)?
            .ok_or_else(|| DomainError::NotFound(format!("ranch {}", command.ranch_id)))?;

        let mut target = self
            .member_repository
            .get_member(&command.ranch_id, &command.member_id)
            .map_err(DomainError::from_store)?
            .ok_or_else(|| DomainError::NotFound(format!("member {}", command.member_id)))?;

        let target_user_id = match (target.accepted, target.user_id.clone()) {
            (true, Some(user_id)) => user_id,
            _ => {
                return Err(DomainError::Validation(
                    "ownership can only be transferred to a member who has accepted their invite"
                        .to_string(),
                ))
            }
        };
        if target_user_id == ranch.owner_user_id {
            return Err(DomainError::Validation(
                "that member already owns the ranch".to_string(),
            ));
        }

        if target.role != Role::Manager {
            target.role = Role::Manager;
            self.member_repository
                .update_member(&command.ranch_id, &target)
                .map_err(DomainError::from_store)?;
        }

        let previous_owner = self
            .list_members(&command.ranch_id)?
            .into_iter()
            .find(|m| m.user_id.as_deref() == Some(ranch.owner_user_id.as_str()));
        if let Some(mut previous) = previous_owner.clone() {
            previous.role = Role::Write;
            self.member_repository
                .update_member(&command.ranch_id, &previous)
                .map_err(DomainError::from_store)?;
        }

        ranch.owner_user_id = target_user_id;
        self.ranch_repository
            .update_ranch(&ranch)
            .map_err(DomainError::from_store)?;

        info!(
            "Transferred ownership of ranch {} to member {}",
            command.ranch_id, target.id
        );
        Ok(TransferOwnershipResult {
            new_owner: target,
            previous_owner: previous_owner.map(|mut m| {
                m.role = Role::Write;
                m
            }),
        })
    }

    fn require_manager(&self, ranch_id: &str, user_id: &str) -> DomainResult<Member> {
        self.list_members(ranch_id)?
            .into_iter()
            .find(|m| {
                m.accepted && m.role == Role::Manager && m.user_id.as_deref() == Some(user_id)
            })
            .ok_or_else(|| {
                DomainError::Authorization("only a manager can manage the team".to_string())
            })
    }

    fn manager_count(&self, ranch_id: &str) -> DomainResult<usize> {
        Ok(self
            .list_members(ranch_id)?
            .iter()
            .filter(|m| m.role == Role::Manager)
            .count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::billing::RanchBilling;
    use crate::domain::models::ranch::Ranch;
    use crate::storage::csv::test_utils::test_connection;
    use tempfile::TempDir;

    const RANCH: &str = "ranch-1";
    const OWNER: &str = "user-owner";

    fn setup() -> (TeamService, Arc<CsvConnection>, TempDir) {
        let (connection, temp_dir) = test_connection();
        let conn = Arc::new(connection);

        let ranch = Ranch {
            id: RANCH.to_string(),
            name: "Bar W".to_string(),
            owner_user_id: OWNER.to_string(),
            billing: RanchBilling::free(),
            created_at: Utc::now(),
        };
        RanchRepository::new(conn.clone()).store_ranch(&ranch).unwrap();

        let owner_member = Member {
            id: "member-owner".to_string(),
            ranch_id: RANCH.to_string(),
            email: "owner@ranch.example".to_string(),
            role: Role::Manager,
            accepted: true,
            user_id: Some(OWNER.to_string()),
            created_at: Utc::now(),
        };
        MemberRepository::new(conn.clone())
            .store_member(RANCH, &owner_member)
            .unwrap();

        (TeamService::new(conn.clone()), conn, temp_dir)
    }

    fn invite(service: &TeamService, email: &str, role: Role) -> Member {
        service
            .invite_member(InviteMemberCommand {
                ranch_id: RANCH.to_string(),
                acting_user_id: OWNER.to_string(),
                email: email.to_string(),
                role,
            })
            .unwrap()
            .member
    }

    fn invite_and_accept(service: &TeamService, email: &str, role: Role, user_id: &str) -> Member {
        invite(service, email, role);
        service
            .accept_invite(AcceptInviteCommand {
                ranch_id: RANCH.to_string(),
                email: email.to_string(),
                user_id: user_id.to_string(),
            })
            .unwrap()
            .member
    }

    #[test]
    fn invite_creates_pending_member() {
        let (service, _conn, _temp_dir) = setup();

        let member = invite(&service, "Hand@Ranch.Example", Role::Write);
        assert!(!member.accepted);
        assert!(member.user_id.is_none());
        assert_eq!(member.email, "hand@ranch.example");
        assert_eq!(member.role, Role::Write);
    }

    #[test]
    fn invite_requires_a_manager() {
        let (service, _conn, _temp_dir) = setup();

        let err = service
            .invite_member(InviteMemberCommand {
                ranch_id: RANCH.to_string(),
                acting_user_id: "user-nobody".to_string(),
                email: "x@y.example".to_string(),
                role: Role::Read,
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::Authorization(_)));
    }

    #[test]
    fn invite_rejects_manager_role_and_duplicates() {
        let (service, _conn, _temp_dir) = setup();

        let err = service
            .invite_member(InviteMemberCommand {
                ranch_id: RANCH.to_string(),
                acting_user_id: OWNER.to_string(),
                email: "x@y.example".to_string(),
                role: Role::Manager,
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        invite(&service, "x@y.example", Role::Read);
        let err = service
            .invite_member(InviteMemberCommand {
                ranch_id: RANCH.to_string(),
                acting_user_id: OWNER.to_string(),
                email: "X@Y.example".to_string(),
                role: Role::Read,
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn accept_invite_binds_identity() {
        let (service, _conn, _temp_dir) = setup();

        let member = invite_and_accept(&service, "hand@ranch.example", Role::Write, "user-2");
        assert!(member.accepted);
        assert_eq!(member.user_id.as_deref(), Some("user-2"));

        // A second accept finds no pending invite.
        let err = service
            .accept_invite(AcceptInviteCommand {
                ranch_id: RANCH.to_string(),
                email: "hand@ranch.example".to_string(),
                user_id: "user-3".to_string(),
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn demoting_the_last_manager_is_rejected() {
        let (service, _conn, _temp_dir) = setup();

        let err = service
            .change_role(ChangeRoleCommand {
                ranch_id: RANCH.to_string(),
                acting_user_id: OWNER.to_string(),
                member_id: "member-owner".to_string(),
                new_role: Role::Write,
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::LastManager));

        // Membership unchanged.
        let members = service.list_members(RANCH).unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].role, Role::Manager);
    }

    #[test]
    fn promote_then_demote_succeeds() {
        let (service, _conn, _temp_dir) = setup();

        let second = invite_and_accept(&service, "hand@ranch.example", Role::Write, "user-2");

        // Demotion still rejected while the owner is the only manager.
        let err = service
            .change_role(ChangeRoleCommand {
                ranch_id: RANCH.to_string(),
                acting_user_id: OWNER.to_string(),
                member_id: "member-owner".to_string(),
                new_role: Role::Write,
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::LastManager));

        service
            .change_role(ChangeRoleCommand {
                ranch_id: RANCH.to_string(),
                acting_user_id: OWNER.to_string(),
                member_id: second.id.clone(),
                new_role: Role::Manager,
            })
            .unwrap();

        let result = service
            .change_role(ChangeRoleCommand {
                ranch_id: RANCH.to_string(),
                acting_user_id: OWNER.to_string(),
                member_id: "member-owner".to_string(),
                new_role: Role::Write,
            })
            .unwrap();
        assert_eq!(result.member.role, Role::Write);
    }

    #[test]
    fn removing_the_last_manager_is_rejected() {
        let (service, _conn, _temp_dir) = setup();

        let err = service
            .remove_member(RemoveMemberCommand {
                ranch_id: RANCH.to_string(),
                acting_user_id: OWNER.to_string(),
                member_id: "member-owner".to_string(),
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::LastManager));

        let reader = invite_and_accept(&service, "r@x.example", Role::Read, "user-3");
        service
            .remove_member(RemoveMemberCommand {
                ranch_id: RANCH.to_string(),
                acting_user_id: OWNER.to_string(),
                member_id: reader.id,
            })
            .unwrap();
        assert_eq!(service.list_members(RANCH).unwrap().len(), 1);
    }

    #[test]
    fn transfer_ownership_promotes_and_demotes() {
        let (service, conn, _temp_dir) = setup();

        let target = invite_and_accept(&service, "hand@ranch.example", Role::Write, "user-2");

        let result = service
            .transfer_ownership(TransferOwnershipCommand {
                ranch_id: RANCH.to_string(),
                acting_user_id: OWNER.to_string(),
                member_id: target.id.clone(),
            })
            .unwrap();

        assert_eq!(result.new_owner.role, Role::Manager);
        assert_eq!(
            result.previous_owner.as_ref().map(|m| m.role),
            Some(Role::Write)
        );

        let ranch = RanchRepository::new(conn.clone())
            .get_ranch(RANCH)
            .unwrap()
            .unwrap();
        assert_eq!(ranch.owner_user_id, "user-2");

        let members = service.list_members(RANCH).unwrap();
        let owner_row = members.iter().find(|m| m.id == "member-owner").unwrap();
        assert_eq!(owner_row.role, Role::Write);
    }

    #[test]
    fn transfer_requires_an_accepted_target() {
        let (service, _conn, _temp_dir) = setup();

        let pending = invite(&service, "hand@ranch.example", Role::Write);
        let err = service
            .transfer_ownership(TransferOwnershipCommand {
                ranch_id: RANCH.to_string(),
                acting_user_id: OWNER.to_string(),
                member_id: pending.id,
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn role_for_user_reports_accepted_members_only() {
        let (service, _conn, _temp_dir) = setup();

        assert_eq!(service.role_for_user(RANCH, OWNER).unwrap(), Some(Role::Manager));
        assert_eq!(service.role_for_user(RANCH, "user-9").unwrap(), None);

        invite(&service, "hand@ranch.example", Role::Write);
        assert_eq!(service.role_for_user(RANCH, "user-2").unwrap(), None);
    }
}
