use async_trait::async_trait;
use uuid::Uuid;

use crate::contract::model::MemberProfile;
use crate::domain::error::DomainError;

/// Transport-agnostic lookup of member display fields in the account service.
#[async_trait]
pub trait MemberDirectory: Send + Sync {
    /// `Ok(None)` when the account service does not know the member.
    async fn find_member(&self, id: Uuid) -> Result<Option<MemberProfile>, DomainError>;
}
