use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::HisaabError;
use crate::membership::Membership;
use crate::models::Group;

#[derive(Default)]
struct MembershipState {
    /// Friendship pairs stored as (smaller id, larger id).
    friendships: HashSet<(Uuid, Uuid)>,
    groups: HashMap<Uuid, Group>,
}

/// In-memory friend and group registry. Cloning shares the underlying
/// state, so the HTTP layer and the service can hold the same registry.
#[derive(Clone, Default)]
pub struct InMemoryMembership {
    state: Arc<RwLock<MembershipState>>,
}

fn pair(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a <= b { (a, b) } else { (b, a) }
}

impl InMemoryMembership {
    pub fn new() -> Self {
        InMemoryMembership::default()
    }

    /// Records a mutual friendship between the two users.
    pub async fn add_friendship(&self, a: Uuid, b: Uuid) -> Result<(), HisaabError> {
        if a == b {
            return Err(HisaabError::invalid_input(
                "friend_id",
                "cannot befriend yourself",
            ));
        }
        let mut state = self.state.write().await;
        state.friendships.insert(pair(a, b));
        Ok(())
    }

    /// Creates a group containing `members` plus its creator.
    pub async fn create_group(
        &self,
        name: String,
        members: Vec<Uuid>,
        created_by: Uuid,
    ) -> Result<Group, HisaabError> {
        let mut seen = HashSet::new();
        let mut all_members = Vec::new();
        for member in members.into_iter().chain(std::iter::once(created_by)) {
            if seen.insert(member) {
                all_members.push(member);
            }
        }

        let group = Group {
            id: Uuid::new_v4(),
            name,
            members: all_members,
            created_by,
            created_at: Utc::now(),
        };

        let mut state = self.state.write().await;
        state.groups.insert(group.id, group.clone());
        Ok(group)
    }

    pub async fn get_group(&self, group_id: Uuid) -> Option<Group> {
        let state = self.state.read().await;
        state.groups.get(&group_id).cloned()
    }
}

#[async_trait]
impl Membership for InMemoryMembership {
    async fn is_authorized_participant(&self, actor_id: Uuid, target_id: Uuid) -> Result<bool, HisaabError> {
        if actor_id == target_id {
            return Ok(true);
        }
        let state = self.state.read().await;
        Ok(state.friendships.contains(&pair(actor_id, target_id)))
    }

    async fn is_group_member(&self, group_id: Uuid, user_id: Uuid) -> Result<bool, HisaabError> {
        let state = self.state.read().await;
        Ok(state
            .groups
            .get(&group_id)
            .is_some_and(|group| group.has_member(user_id)))
    }
}
