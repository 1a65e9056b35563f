use std::sync::Arc;

use tracing::info;

use super::domain::{NewTeam, Team, TeamId, TeamPatch};
use crate::clock::Clock;
use crate::persistence::UnitOfWork;
use crate::workflows::applications::{ApplicationStatus, StudentCourse};
use crate::workflows::courses::CourseId;
use crate::workflows::users::UserId;
use crate::workflows::{messages, required_text, ServiceError};

const MAX_NAME: usize = 100;
const MAX_MEMBERS: u32 = 50;

pub struct TeamService<U> {
    store: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<U> TeamService<U>
where
    U: UnitOfWork + 'static,
{
    pub fn new(store: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub async fn create_team(&self, draft: NewTeam) -> Result<Team, ServiceError> {
        if self.store.courses().get_by_id(draft.course_id).await?.is_none() {
            return Err(ServiceError::invalid(messages::COURSE_NOT_FOUND));
        }
        let name = team_name(&draft.name)?;
        check_size(draft.max_members)?;
        self.ensure_name_free(draft.course_id, &name, None).await?;

        let now = self.clock.now();
        let team = Team {
            id: TeamId::default(),
            course_id: draft.course_id,
            name,
            leader_id: None,
            member_ids: Vec::new(),
            max_members: draft.max_members,
            created_at: now,
            updated_at: now,
        };
        let team = self.store.teams().add(team).await?;
        self.store.save_changes().await?;
        info!(team_id = %team.id, course_id = %team.course_id, "team created");
        Ok(team)
    }

    pub async fn update_team(&self, id: TeamId, mut patch: TeamPatch) -> Result<Team, ServiceError> {
        let mut team = self.load(id).await?;
        if let Some(name) = patch.name.as_deref() {
            let name = team_name(name)?;
            self.ensure_name_free(team.course_id, &name, Some(id)).await?;
            patch.name = Some(name);
        }
        if let Some(max_members) = patch.max_members {
            check_size(max_members)?;
            if (max_members as usize) < team.member_ids.len() {
                return Err(ServiceError::invalid(messages::TEAM_SIZE_BELOW_MEMBERS));
            }
        }

        team.merge(patch);
        self.persist(team, "team updated").await
    }

    pub async fn delete_team(&self, id: TeamId) -> Result<(), ServiceError> {
        self.load(id).await?;
        self.store.teams().delete(id).await?;
        self.store.save_changes().await?;
        info!(team_id = %id, "team deleted");
        Ok(())
    }

    /// Add an approved student of the team's course who has no team yet.
    pub async fn add_member(&self, id: TeamId, user_id: UserId) -> Result<Team, ServiceError> {
        let mut team = self.load(id).await?;
        if self.store.users().get_by_id(user_id).await?.is_none() {
            return Err(ServiceError::invalid(messages::USER_NOT_FOUND));
        }

        let course_id = team.course_id;
        let approved = self
            .store
            .applications()
            .count(&|application: &StudentCourse| {
                application.course_id == course_id
                    && application.student_id == user_id
                    && application.status == ApplicationStatus::Approved
            })
            .await?;
        if approved == 0 {
            return Err(ServiceError::invalid(messages::NOT_APPROVED_FOR_COURSE));
        }

        let already_placed = self
            .store
            .teams()
            .count(&|other: &Team| other.course_id == course_id && other.has_member(user_id))
            .await?;
        if already_placed > 0 {
            return Err(ServiceError::invalid(messages::ALREADY_IN_TEAM));
        }
        if team.is_full() {
            return Err(ServiceError::invalid(messages::TEAM_FULL));
        }

        team.member_ids.push(user_id);
        self.persist(team, "team member added").await
    }

    /// Remove a member; a departing leader leaves the team leaderless.
    pub async fn remove_member(&self, id: TeamId, user_id: UserId) -> Result<Team, ServiceError> {
        let mut team = self.load(id).await?;
        if !team.has_member(user_id) {
            return Err(ServiceError::invalid(messages::NOT_A_TEAM_MEMBER));
        }
        team.member_ids.retain(|member| *member != user_id);
        if team.leader_id == Some(user_id) {
            team.leader_id = None;
        }
        self.persist(team, "team member removed").await
    }

    pub async fn set_leader(&self, id: TeamId, user_id: UserId) -> Result<Team, ServiceError> {
        let mut team = self.load(id).await?;
        if !team.has_member(user_id) {
            return Err(ServiceError::invalid(messages::NOT_A_TEAM_MEMBER));
        }
        team.leader_id = Some(user_id);
        self.persist(team, "team leader set").await
    }

    pub async fn get_team(&self, id: TeamId) -> Result<Team, ServiceError> {
        self.load(id).await
    }

    pub async fn list_teams(&self, course_id: CourseId) -> Result<Vec<Team>, ServiceError> {
        let mut teams = self
            .store
            .teams()
            .get_all(&|team: &Team| team.course_id == course_id)
            .await?;
        teams.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(teams)
    }

    async fn persist(&self, mut team: Team, event: &'static str) -> Result<Team, ServiceError> {
        team.updated_at = self.clock.now();
        self.store.teams().update(team.clone()).await?;
        self.store.save_changes().await?;
        info!(team_id = %team.id, members = team.member_ids.len(), "{event}");
        Ok(team)
    }

    async fn load(&self, id: TeamId) -> Result<Team, ServiceError> {
        self.store
            .teams()
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::invalid(messages::TEAM_NOT_FOUND))
    }

    async fn ensure_name_free(
        &self,
        course_id: CourseId,
        name: &str,
        except: Option<TeamId>,
    ) -> Result<(), ServiceError> {
        let lowered = name.to_lowercase();
        let taken = self
            .store
            .teams()
            .count(&|team: &Team| {
                team.course_id == course_id
                    && Some(team.id) != except
                    && team.name.to_lowercase() == lowered
            })
            .await?;
        if taken > 0 {
            return Err(ServiceError::invalid(messages::TEAM_NAME_TAKEN));
        }
        Ok(())
    }
}

fn team_name(raw: &str) -> Result<String, ServiceError> {
    required_text(
        raw,
        MAX_NAME,
        messages::TEAM_NAME_REQUIRED,
        messages::TEAM_NAME_TOO_LONG,
    )
}

fn check_size(max_members: u32) -> Result<(), ServiceError> {
    if max_members == 0 || max_members > MAX_MEMBERS {
        return Err(ServiceError::invalid(messages::TEAM_SIZE_OUT_OF_RANGE));
    }
    Ok(())
}
