use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::contract::model::MemberProfile;
use crate::domain::error::DomainError;
use crate::domain::ports::MemberDirectory;

/// Process-local member directory, seeded from `facility.members` or by tests.
#[derive(Debug, Default)]
pub struct InMemoryMemberDirectory {
    members: DashMap<Uuid, MemberProfile>,
}

impl InMemoryMemberDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&self, member: MemberProfile) {
        self.members.insert(member.id, member);
    }
}

#[async_trait]
impl MemberDirectory for InMemoryMemberDirectory {
    async fn find_member(&self, id: Uuid) -> Result<Option<MemberProfile>, DomainError> {
        Ok(self.members.get(&id).map(|m| m.value().clone()))
    }
}
