use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::persistence::{entity_id, Entity};
use crate::workflows::courses::CourseId;
use crate::workflows::users::UserId;

entity_id!(
    /// Identifier of a team.
    TeamId
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub course_id: CourseId,
    pub name: String,
    pub leader_id: Option<UserId>,
    pub member_ids: Vec<UserId>,
    pub max_members: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Team {
    type Id = TeamId;
    const NAME: &'static str = "team";

    fn id(&self) -> TeamId {
        self.id
    }

    fn assign_id(&mut self, id: TeamId) {
        self.id = id;
    }
}

impl Team {
    pub fn has_member(&self, user_id: UserId) -> bool {
        self.member_ids.contains(&user_id)
    }

    pub fn is_full(&self) -> bool {
        self.member_ids.len() >= self.max_members as usize
    }

    pub fn merge(&mut self, patch: TeamPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(max_members) = patch.max_members {
            self.max_members = max_members;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTeam {
    pub course_id: CourseId,
    pub name: String,
    pub max_members: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub max_members: Option<u32>,
}
