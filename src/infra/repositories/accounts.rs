//! Users, profiles and employee records.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, Set, SqlErr,
};
use uuid::Uuid;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

use super::entities::{employee_info, profile, user};
use crate::domain::{
    Account, ContactUpdate, EmergencyContact, EmployeeInfo, NewUser, Profile, Role, User,
};
use crate::errors::{AppError, AppResult, FieldErrors};

/// Read access to accounts outside a transaction.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn find_account(&self, user_id: Uuid) -> AppResult<Option<Account>>;

    async fn find_account_by_username(&self, username: &str) -> AppResult<Option<Account>>;

    async fn username_taken(&self, username: &str) -> AppResult<bool>;

    async fn find_employee_info(&self, profile_id: Uuid) -> AppResult<Option<EmployeeInfo>>;
}

/// Account queries over any connection, pooled or transactional.
pub struct AccountQueries<'c, C> {
    conn: &'c C,
}

impl<'c, C: ConnectionTrait> AccountQueries<'c, C> {
    pub fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    pub async fn find_account(&self, user_id: Uuid) -> AppResult<Option<Account>> {
        let row = user::Entity::find_by_id(user_id)
            .find_also_related(profile::Entity)
            .one(self.conn)
            .await?;

        row.map(into_account).transpose()
    }

    pub async fn find_account_by_username(&self, username: &str) -> AppResult<Option<Account>> {
        let row = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .find_also_related(profile::Entity)
            .one(self.conn)
            .await?;

        row.map(into_account).transpose()
    }

    pub async fn username_taken(&self, username: &str) -> AppResult<bool> {
        let count = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .count(self.conn)
            .await?;

        Ok(count > 0)
    }

    pub async fn insert_user(&self, new_user: NewUser) -> AppResult<User> {
        let username = new_user.username.clone();
        let model = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(new_user.username),
            email: Set(new_user.email),
            first_name: Set(new_user.first_name),
            last_name: Set(new_user.last_name),
            password_hash: Set(new_user.password_hash),
            created_at: Set(Utc::now()),
        }
        .insert(self.conn)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                tracing::debug!(%username, "username already registered");
                AppError::InvalidFields(duplicate_username())
            }
            _ => AppError::from(e),
        })?;

        Ok(User::from(model))
    }

    /// Every new user starts as a client with no points.
    pub async fn insert_profile(&self, user_id: Uuid) -> AppResult<Profile> {
        let model = profile::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            role: Set(Role::Client.as_str().to_string()),
            phone: Set(None),
            points: Set(0),
            created_at: Set(Utc::now()),
        }
        .insert(self.conn)
        .await?;

        Ok(Profile::from(model))
    }

    pub async fn set_role(&self, profile_id: Uuid, role: Role) -> AppResult<()> {
        let result = profile::Entity::update_many()
            .col_expr(profile::Column::Role, Expr::value(role.as_str()))
            .filter(profile::Column::Id.eq(profile_id))
            .exec(self.conn)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Profil"));
        }
        Ok(())
    }

    /// Add `points` to the user's balance in one statement and return the new balance.
    pub async fn add_points(&self, user_id: Uuid, points: i64) -> AppResult<i64> {
        let result = profile::Entity::update_many()
            .col_expr(
                profile::Column::Points,
                Expr::col(profile::Column::Points).add(points),
            )
            .filter(profile::Column::UserId.eq(user_id))
            .exec(self.conn)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Profil"));
        }

        let profile = profile::Entity::find()
            .filter(profile::Column::UserId.eq(user_id))
            .one(self.conn)
            .await?
            .ok_or(AppError::NotFound("Profil"))?;

        Ok(profile.points)
    }

    /// Names and email on the user, phone on the profile. Run it in a transaction.
    pub async fn update_contact(&self, user_id: Uuid, update: ContactUpdate) -> AppResult<()> {
        let result = user::Entity::update_many()
            .col_expr(user::Column::FirstName, Expr::value(update.first_name))
            .col_expr(user::Column::LastName, Expr::value(update.last_name))
            .col_expr(user::Column::Email, Expr::value(update.email))
            .filter(user::Column::Id.eq(user_id))
            .exec(self.conn)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Utilisateur"));
        }

        profile::Entity::update_many()
            .col_expr(profile::Column::Phone, Expr::value(update.phone))
            .filter(profile::Column::UserId.eq(user_id))
            .exec(self.conn)
            .await?;

        Ok(())
    }

    pub async fn find_employee_info(&self, profile_id: Uuid) -> AppResult<Option<EmployeeInfo>> {
        let model = employee_info::Entity::find()
            .filter(employee_info::Column::ProfileId.eq(profile_id))
            .one(self.conn)
            .await?;

        Ok(model.map(EmployeeInfo::from))
    }

    pub async fn insert_employee_info(&self, info: &EmployeeInfo) -> AppResult<()> {
        let schedule = serde_json::to_string(&info.schedule)
            .map_err(|e| AppError::internal(format!("schedule encoding failed: {}", e)))?;

        employee_info::ActiveModel {
            id: Set(info.id),
            profile_id: Set(info.profile_id),
            position: Set(info.position.as_str().to_string()),
            contract: Set(info.contract.as_str().to_string()),
            hire_date: Set(info.hire_date),
            hourly_wage_cents: Set(info.hourly_wage.cents()),
            weekly_hours: Set(info.weekly_hours),
            schedule: Set(schedule),
            social_security_number: Set(info.social_security_number.clone()),
            emergency_phone: Set(info.emergency_phone.clone()),
            emergency_contact: Set(info.emergency_contact.clone()),
            active: Set(info.active),
        }
        .insert(self.conn)
        .await?;

        Ok(())
    }

    pub async fn delete_employee_info(&self, profile_id: Uuid) -> AppResult<u64> {
        let result = employee_info::Entity::delete_many()
            .filter(employee_info::Column::ProfileId.eq(profile_id))
            .exec(self.conn)
            .await?;

        Ok(result.rows_affected)
    }

    pub async fn update_emergency_contact(
        &self,
        profile_id: Uuid,
        contact: EmergencyContact,
    ) -> AppResult<()> {
        let result = employee_info::Entity::update_many()
            .col_expr(employee_info::Column::EmergencyPhone, Expr::value(contact.phone))
            .col_expr(employee_info::Column::EmergencyContact, Expr::value(contact.name))
            .filter(employee_info::Column::ProfileId.eq(profile_id))
            .exec(self.conn)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Fiche employé"));
        }
        Ok(())
    }
}

fn into_account((user, profile): (user::Model, Option<profile::Model>)) -> AppResult<Account> {
    let profile = profile.ok_or_else(|| {
        AppError::internal(format!("user {} has no profile", user.id))
    })?;

    Ok(Account {
        user: User::from(user),
        profile: Profile::from(profile),
    })
}

fn duplicate_username() -> FieldErrors {
    FieldErrors::single("username", "Ce nom d'utilisateur est déjà pris.")
}

/// Pool-backed account repository.
pub struct AccountStore {
    db: DatabaseConnection,
}

impl AccountStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn queries(&self) -> AccountQueries<'_, DatabaseConnection> {
        AccountQueries::new(&self.db)
    }
}

#[async_trait]
impl AccountRepository for AccountStore {
    async fn find_account(&self, user_id: Uuid) -> AppResult<Option<Account>> {
        self.queries().find_account(user_id).await
    }

    async fn find_account_by_username(&self, username: &str) -> AppResult<Option<Account>> {
        self.queries().find_account_by_username(username).await
    }

    async fn username_taken(&self, username: &str) -> AppResult<bool> {
        self.queries().username_taken(username).await
    }

    async fn find_employee_info(&self, profile_id: Uuid) -> AppResult<Option<EmployeeInfo>> {
        self.queries().find_employee_info(profile_id).await
    }
}
