use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;

use super::domain::{NewUser, Role, User, UserFilter, UserId, UserPatch, UserStatus, UserView};
use crate::clock::Clock;
use crate::outbound::EmailSender;
use crate::persistence::UnitOfWork;
use crate::security::PasswordHasher;
use crate::validation::{check_email, check_password, check_phone};
use crate::workflows::applications::{ApplicationStatus, StudentCourse};
use crate::workflows::{messages, required_text, ServiceError};

pub const WELCOME_TEMPLATE: &str = "welcome";

const MAX_FULL_NAME: usize = 100;

/// Account management: registration, profile edits, credentials and status.
pub struct UserService<U, M> {
    store: Arc<U>,
    mailer: Arc<M>,
    hasher: Arc<dyn PasswordHasher>,
    clock: Arc<dyn Clock>,
}

impl<U, M> UserService<U, M>
where
    U: UnitOfWork + 'static,
    M: EmailSender + 'static,
{
    pub fn new(
        store: Arc<U>,
        mailer: Arc<M>,
        hasher: Arc<dyn PasswordHasher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            mailer,
            hasher,
            clock,
        }
    }

    /// Register an account and send the welcome e-mail.
    pub async fn create_user(&self, draft: NewUser) -> Result<UserView, ServiceError> {
        let full_name = required_text(
            &draft.full_name,
            MAX_FULL_NAME,
            messages::FULL_NAME_REQUIRED,
            messages::FULL_NAME_TOO_LONG,
        )?;
        let email = normalize_email(&draft.email)?;
        check_password(&draft.password).map_err(|rule| ServiceError::invalid(rule.message()))?;
        let phone = draft.phone.as_deref().map(normalize_phone).transpose()?;
        let student_code = match (draft.role, draft.student_code.as_deref().map(str::trim)) {
            (Role::Student, None) | (Role::Student, Some("")) => {
                return Err(ServiceError::invalid(messages::STUDENT_CODE_REQUIRED));
            }
            (_, Some(code)) if !code.is_empty() => Some(code.to_string()),
            _ => None,
        };

        self.ensure_email_free(&email, None).await?;
        if let Some(code) = student_code.as_deref() {
            self.ensure_student_code_free(code, None).await?;
        }

        let now = self.clock.now();
        let user = User {
            id: UserId::default(),
            full_name,
            email,
            student_code,
            phone,
            role: draft.role,
            status: UserStatus::Active,
            password_hash: self.hasher.hash(&draft.password),
            created_at: now,
            updated_at: now,
        };

        let user = self.store.users().add(user).await?;
        self.store.save_changes().await?;
        info!(user_id = %user.id, role = user.role.label(), "user created");

        let mut substitutions = BTreeMap::new();
        substitutions.insert("full_name".to_string(), user.full_name.clone());
        substitutions.insert("email".to_string(), user.email.clone());
        substitutions.insert("role".to_string(), user.role.label().to_string());
        self.mailer
            .send_email(&user.email, WELCOME_TEMPLATE, &substitutions)
            .await?;

        Ok(UserView::from(&user))
    }

    pub async fn update_user(
        &self,
        id: UserId,
        mut patch: UserPatch,
    ) -> Result<UserView, ServiceError> {
        let mut user = self.load(id).await?;

        if let Some(full_name) = patch.full_name.as_deref() {
            patch.full_name = Some(required_text(
                full_name,
                MAX_FULL_NAME,
                messages::FULL_NAME_REQUIRED,
                messages::FULL_NAME_TOO_LONG,
            )?);
        }
        if let Some(email) = patch.email.as_deref() {
            let email = normalize_email(email)?;
            if !email.eq_ignore_ascii_case(&user.email) {
                self.ensure_email_free(&email, Some(id)).await?;
            }
            patch.email = Some(email);
        }
        if let Some(phone) = patch.phone.as_deref() {
            patch.phone = Some(normalize_phone(phone)?);
        }
        if let Some(code) = patch.student_code.as_deref() {
            let code = code.trim();
            if code.is_empty() {
                return Err(ServiceError::invalid(messages::STUDENT_CODE_REQUIRED));
            }
            self.ensure_student_code_free(code, Some(id)).await?;
            patch.student_code = Some(code.to_string());
        }

        user.merge(patch);
        user.updated_at = self.clock.now();
        self.store.users().update(user.clone()).await?;
        self.store.save_changes().await?;
        info!(user_id = %id, "user updated");
        Ok(UserView::from(&user))
    }

    pub async fn change_password(
        &self,
        id: UserId,
        current: &str,
        new_password: &str,
    ) -> Result<(), ServiceError> {
        let mut user = self.load(id).await?;
        if !self.hasher.verify(current, &user.password_hash) {
            return Err(ServiceError::invalid(messages::CURRENT_PASSWORD_WRONG));
        }
        check_password(new_password).map_err(|rule| ServiceError::invalid(rule.message()))?;
        if current == new_password {
            return Err(ServiceError::invalid(messages::PASSWORD_UNCHANGED));
        }

        user.password_hash = self.hasher.hash(new_password);
        user.updated_at = self.clock.now();
        self.store.users().update(user).await?;
        self.store.save_changes().await?;
        info!(user_id = %id, "password changed");
        Ok(())
    }

    pub async fn set_status(
        &self,
        id: UserId,
        status: UserStatus,
    ) -> Result<UserView, ServiceError> {
        let mut user = self.load(id).await?;
        if user.status == status {
            return Ok(UserView::from(&user));
        }
        user.status = status;
        user.updated_at = self.clock.now();
        self.store.users().update(user.clone()).await?;
        self.store.save_changes().await?;
        info!(user_id = %id, status = status.label(), "user status changed");
        Ok(UserView::from(&user))
    }

    pub async fn get_user(&self, id: UserId) -> Result<UserView, ServiceError> {
        let user = self.load(id).await?;
        Ok(UserView::from(&user))
    }

    pub async fn list_users(&self, filter: &UserFilter) -> Result<Vec<UserView>, ServiceError> {
        let mut users = self
            .store
            .users()
            .get_all(&|user: &User| filter.matches(user))
            .await?;
        users.sort_by_key(|user| user.id);
        Ok(users.iter().map(UserView::from).collect())
    }

    /// Active secretaries in ascending id order.
    pub async fn active_secretaries(&self) -> Result<Vec<UserView>, ServiceError> {
        let filter = UserFilter {
            role: Some(Role::Secretary),
            status: Some(UserStatus::Active),
            keyword: None,
        };
        self.list_users(&filter).await
    }

    pub async fn delete_user(&self, id: UserId) -> Result<(), ServiceError> {
        let user = self.load(id).await?;
        if user.role == Role::Secretary {
            let pending = self
                .store
                .applications()
                .count(&|application: &StudentCourse| {
                    application.reviewer_id == Some(id)
                        && application.status == ApplicationStatus::Pending
                })
                .await?;
            if pending > 0 {
                return Err(ServiceError::invalid(messages::USER_HAS_PENDING_REVIEWS));
            }
        }

        self.store.users().delete(id).await?;
        self.store.save_changes().await?;
        info!(user_id = %id, "user deleted");
        Ok(())
    }

    async fn load(&self, id: UserId) -> Result<User, ServiceError> {
        self.store
            .users()
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::invalid(messages::USER_NOT_FOUND))
    }

    async fn ensure_email_free(
        &self,
        email: &str,
        except: Option<UserId>,
    ) -> Result<(), ServiceError> {
        let taken = self
            .store
            .users()
            .count(&|user: &User| {
                Some(user.id) != except && user.email.eq_ignore_ascii_case(email)
            })
            .await?;
        if taken > 0 {
            return Err(ServiceError::invalid(messages::EMAIL_TAKEN));
        }
        Ok(())
    }

    async fn ensure_student_code_free(
        &self,
        code: &str,
        except: Option<UserId>,
    ) -> Result<(), ServiceError> {
        let taken = self
            .store
            .users()
            .count(&|user: &User| {
                Some(user.id) != except
                    && user
                        .student_code
                        .as_deref()
                        .is_some_and(|existing| existing.eq_ignore_ascii_case(code))
            })
            .await?;
        if taken > 0 {
            return Err(ServiceError::invalid(messages::STUDENT_CODE_TAKEN));
        }
        Ok(())
    }
}

fn normalize_email(raw: &str) -> Result<String, ServiceError> {
    check_email(raw).map_err(|rule| ServiceError::invalid(rule.message()))?;
    Ok(raw.trim().to_ascii_lowercase())
}

fn normalize_phone(raw: &str) -> Result<String, ServiceError> {
    check_phone(raw).map_err(|rule| ServiceError::invalid(rule.message()))?;
    Ok(raw.trim().to_string())
}
