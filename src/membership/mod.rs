use async_trait::async_trait;
use uuid::Uuid;

use crate::error::HisaabError;

pub mod in_memory;

/// Relationship checks the ledger consults before accepting participants.
///
/// The ledger itself owns no friend or group data; it only asks these two
/// questions and treats the answers as authoritative.
#[async_trait]
pub trait Membership: Send + Sync {
    /// May `actor` split or transact with `target`? Users are always
    /// authorized with themselves.
    async fn is_authorized_participant(&self, actor_id: Uuid, target_id: Uuid) -> Result<bool, HisaabError>;

    /// Is `user_id` a member of the group? Unknown groups have no members.
    async fn is_group_member(&self, group_id: Uuid, user_id: Uuid) -> Result<bool, HisaabError>;
}
