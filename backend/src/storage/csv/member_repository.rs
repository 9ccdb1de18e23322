use anyhow::Result;
use csv::{Reader, Writer};
use std::fs::File;
use std::io::BufReader;
use std::sync::Arc;
use tracing::warn;

use super::connection::{write_atomic, CsvConnection, MEMBERS_HEADER};
use crate::domain::models::member::{Member, Role};
use crate::storage::traits::MemberStorage;

/// CSV-based member repository; one `members.csv` per ranch.
#[derive(Clone)]
pub struct MemberRepository {
    connection: Arc<CsvConnection>,
}

impl MemberRepository {
    pub fn new(connection: Arc<CsvConnection>) -> Self {
        Self { connection }
    }

    fn read_members(&self, ranch_id: &str) -> Result<Vec<Member>> {
        let file_path = self.connection.members_file(ranch_id);

        if !file_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&file_path)?;
        let reader = BufReader::new(file);
        let mut csv_reader = Reader::from_reader(reader);

        let mut members = Vec::new();
        for result in csv_reader.records() {
            let record = result?;

            let role_raw = record.get(2).unwrap_or("");
            let role = match Role::parse(role_raw) {
                Some(role) => role,
                None => {
                    warn!("Unknown role '{}', treating as read", role_raw);
                    Role::Read
                }
            };

            let created_raw = record.get(5).unwrap_or("");
            let created_at = match chrono::DateTime::parse_from_rfc3339(created_raw) {
                Ok(dt) => dt.with_timezone(&chrono::Utc),
                Err(e) => {
                    warn!("Failed to parse member date '{}': {}", created_raw, e);
                    continue;
                }
            };

            let user_id_raw = record.get(4).unwrap_or("");
            members.push(Member {
                id: record.get(0).unwrap_or("").to_string(),
                ranch_id: ranch_id.to_string(),
                email: record.get(1).unwrap_or("").to_string(),
                role,
                accepted: record.get(3).unwrap_or("false") == "true",
                user_id: if user_id_raw.is_empty() {
                    None
                } else {
                    Some(user_id_raw.to_string())
                },
                created_at,
            });
        }

        Ok(members)
    }

    fn write_members(&self, ranch_id: &str, members: &[Member]) -> Result<()> {
        self.connection.ensure_ranch_layout(ranch_id)?;

        let mut csv_writer = Writer::from_writer(Vec::new());
        csv_writer.write_record(MEMBERS_HEADER)?;
        for member in members {
            csv_writer.write_record([
                member.id.as_str(),
                member.email.as_str(),
                member.role.as_str(),
                if member.accepted { "true" } else { "false" },
                member.user_id.as_deref().unwrap_or(""),
                member.created_at.to_rfc3339().as_str(),
            ])?;
        }

        let bytes = csv_writer.into_inner()?;
        write_atomic(&self.connection.members_file(ranch_id), &bytes)
    }
}

impl MemberStorage for MemberRepository {
    fn store_member(&self, ranch_id: &str, member: &Member) -> Result<()> {
        let mut members = self.read_members(ranch_id)?;
        members.push(member.clone());
        self.write_members(ranch_id, &members)
    }

    fn get_member(&self, ranch_id: &str, member_id: &str) -> Result<Option<Member>> {
        Ok(self
            .read_members(ranch_id)?
            .into_iter()
            .find(|m| m.id == member_id))
    }

    fn list_members(&self, ranch_id: &str) -> Result<Vec<Member>> {
        self.read_members(ranch_id)
    }

    fn update_member(&self, ranch_id: &str, member: &Member) -> Result<()> {
        let mut members = self.read_members(ranch_id)?;
        let index = members.iter().position(|m| m.id == member.id);

        match index {
            Some(index) => {
                members[index] = member.clone();
                self.write_members(ranch_id, &members)
            }
            None => {
                warn!("Attempted to update a non-existent member: {}", member.id);
                Err(anyhow::anyhow!("Member not found for update"))
            }
        }
    }

    fn delete_member(&self, ranch_id: &str, member_id: &str) -> Result<()> {
        let members = self.read_members(ranch_id)?;
        let kept: Vec<Member> = members.into_iter().filter(|m| m.id != member_id).collect();
        self.write_members(ranch_id, &kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::csv::test_utils::test_connection;
    use chrono::Utc;

    fn member(id: &str, email: &str, role: Role) -> Member {
        Member {
            id: id.to_string(),
            ranch_id: "ranch-1".to_string(),
            email: email.to_string(),
            role,
            accepted: false,
            user_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn store_and_update_member() {
        let (connection, _temp_dir) = test_connection();
        let repo = MemberRepository::new(Arc::new(connection));

        let pending = member("m1", "hand@ranch.example", Role::Write);
        repo.store_member("ranch-1", &pending).unwrap();

        let mut accepted = pending.clone();
        accepted.accepted = true;
        accepted.user_id = Some("user-9".to_string());
        repo.update_member("ranch-1", &accepted).unwrap();

        let loaded = repo.get_member("ranch-1", "m1").unwrap().unwrap();
        assert!(loaded.accepted);
        assert_eq!(loaded.user_id.as_deref(), Some("user-9"));
        assert_eq!(loaded.role, Role::Write);
    }

    #[test]
    fn delete_member_keeps_others() {
        let (connection, _temp_dir) = test_connection();
        let repo = MemberRepository::new(Arc::new(connection));

        repo.store_member("ranch-1", &member("m1", "a@x.example", Role::Manager))
            .unwrap();
        repo.store_member("ranch-1", &member("m2", "b@x.example", Role::Read))
            .unwrap();

        repo.delete_member("ranch-1", "m2").unwrap();

        let members = repo.list_members("ranch-1").unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].id, "m1");
    }
}
