use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A named circle of users. Groups scope expense listings, settlement
/// queries, and money requests; the membership registry owns them.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub members: Vec<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Group {
    pub fn has_member(&self, user_id: Uuid) -> bool {
        self.members.contains(&user_id)
    }
}
