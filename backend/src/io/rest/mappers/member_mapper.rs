use crate::domain::models::member::{Member as DomainMember, Role as DomainRole};
use shared::{Member as SharedMember, MemberListResponse, Role as SharedRole};

/// Mapper to convert between shared member DTOs and domain models.
pub struct MemberMapper;

impl MemberMapper {
    pub fn role_to_domain(role: SharedRole) -> DomainRole {
        match role {
            SharedRole::Manager => DomainRole::Manager,
            SharedRole::Write => DomainRole::Write,
            SharedRole::Read => DomainRole::Read,
        }
    }

    pub fn role_to_dto(role: DomainRole) -> SharedRole {
        match role {
            DomainRole::Manager => SharedRole::Manager,
            DomainRole::Write => SharedRole::Write,
            DomainRole::Read => SharedRole::Read,
        }
    }

    pub fn to_dto(member: DomainMember) -> SharedMember {
        SharedMember {
            id: member.id,
            email: member.email,
            role: Self::role_to_dto(member.role),
            accepted: member.accepted,
            user_id: member.user_id,
            created_at: member.created_at.to_rfc3339(),
        }
    }

    pub fn to_member_list_dto(members: Vec<DomainMember>) -> MemberListResponse {
        MemberListResponse {
            members: members.into_iter().map(Self::to_dto).collect(),
        }
    }
}
