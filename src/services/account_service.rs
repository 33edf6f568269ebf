//! Accounts: the session actor, dashboards, contact details and role changes.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::ConnectionTrait;
use serde::Serialize;
use uuid::Uuid;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

use crate::domain::{
    Account, Actor, ContactUpdate, EmergencyContact, EmployeeInfo, Money, OrderDetails, Profile,
    ReservationDetails, Review, Role, ScheduleEntry,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{AccountQueries, UnitOfWork};
use crate::with_transaction;

/// What a client sees on their account page.
#[derive(Debug, Clone, Serialize)]
pub struct ClientDashboard {
    pub account: Account,
    pub orders: Vec<OrderDetails>,
    pub reservations: Vec<ReservationDetails>,
    pub reviews: Vec<Review>,
}

/// An employee's record with the figures derived from it.
#[derive(Debug, Clone, Serialize)]
pub struct EmployeeRecord {
    pub account: Account,
    pub info: EmployeeInfo,
    pub schedule: Vec<ScheduleEntry>,
    pub monthly_salary: Money,
    pub seniority_days: i64,
    pub seniority_years: i64,
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Current identity and role of a user, `None` if the user no longer exists.
    async fn actor(&self, user_id: Uuid) -> AppResult<Option<Actor>>;

    async fn client_dashboard(&self, user_id: Uuid) -> AppResult<ClientDashboard>;

    async fn update_contact(&self, user_id: Uuid, update: ContactUpdate) -> AppResult<()>;

    /// Change a user's role, creating or removing their employee record.
    async fn change_role(&self, username: String, role: Role) -> AppResult<Account>;

    /// The employee's record, created with defaults if it is missing.
    async fn employee_record(&self, user_id: Uuid) -> AppResult<EmployeeRecord>;

    async fn update_employee_contact(
        &self,
        user_id: Uuid,
        update: ContactUpdate,
        emergency: EmergencyContact,
    ) -> AppResult<()>;
}

/// Apply `role` to `profile` with its hooks: becoming an employee opens an
/// employee record, going back to client deletes it.
pub(crate) async fn assign_role<C: ConnectionTrait>(
    accounts: &AccountQueries<'_, C>,
    mut profile: Profile,
    role: Role,
    today: NaiveDate,
) -> AppResult<Profile> {
    if profile.role != role {
        accounts.set_role(profile.id, role).await?;
        profile.role = role;
    }

    match role {
        Role::Employee => {
            if accounts.find_employee_info(profile.id).await?.is_none() {
                accounts
                    .insert_employee_info(&EmployeeInfo::hire(profile.id, today))
                    .await?;
                tracing::info!(profile_id = %profile.id, "employee record opened");
            }
        }
        Role::Client => {
            if accounts.delete_employee_info(profile.id).await? > 0 {
                tracing::info!(profile_id = %profile.id, "employee record removed");
            }
        }
    }

    Ok(profile)
}

pub struct AccountManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> AccountManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn account(&self, user_id: Uuid) -> AppResult<Account> {
        self.uow
            .accounts()
            .find_account(user_id)
            .await?
            .ok_or_not_found("Utilisateur")
    }
}

#[async_trait]
impl<U: UnitOfWork> AccountService for AccountManager<U> {
    async fn actor(&self, user_id: Uuid) -> AppResult<Option<Actor>> {
        let account = self.uow.accounts().find_account(user_id).await?;
        Ok(account.map(|account| account.actor()))
    }

    async fn client_dashboard(&self, user_id: Uuid) -> AppResult<ClientDashboard> {
        let orders = self.uow.orders();
        let reservations = self.uow.reservations();
        let reviews = self.uow.reviews();

        let (account, orders, reservations, reviews) = tokio::try_join!(
            self.account(user_id),
            orders.list_for_user(user_id),
            reservations.list_for_user(user_id),
            reviews.list_for_user(user_id),
        )?;

        Ok(ClientDashboard {
            account,
            orders,
            reservations,
            reviews,
        })
    }

    async fn update_contact(&self, user_id: Uuid, update: ContactUpdate) -> AppResult<()> {
        with_transaction!(self.uow, |ctx| {
            ctx.accounts().update_contact(user_id, update).await
        })?;
        tracing::info!(%user_id, "contact details updated");
        Ok(())
    }

    async fn change_role(&self, username: String, role: Role) -> AppResult<Account> {
        let today = chrono::Local::now().date_naive();

        let account = with_transaction!(self.uow, |ctx| {
            let accounts = ctx.accounts();
            let account = accounts
                .find_account_by_username(&username)
                .await?
                .ok_or_not_found("Utilisateur")?;
            let profile = assign_role(&accounts, account.profile, role, today).await?;
            Ok(Account {
                user: account.user,
                profile,
            })
        })?;

        tracing::info!(username = %account.user.username, %role, "role changed");
        Ok(account)
    }

    async fn employee_record(&self, user_id: Uuid) -> AppResult<EmployeeRecord> {
        let today = chrono::Local::now().date_naive();

        let (account, info) = with_transaction!(self.uow, |ctx| {
            let accounts = ctx.accounts();
            let account = accounts
                .find_account(user_id)
                .await?
                .ok_or_not_found("Utilisateur")?;
            if account.profile.role != Role::Employee {
                return Err(AppError::Forbidden);
            }

            let info = match accounts.find_employee_info(account.profile.id).await? {
                Some(info) => info,
                None => {
                    let info = EmployeeInfo::hire(account.profile.id, today);
                    accounts.insert_employee_info(&info).await?;
                    info
                }
            };
            Ok((account, info))
        })?;

        Ok(EmployeeRecord {
            schedule: info.schedule.entries(),
            monthly_salary: info.monthly_salary(),
            seniority_days: info.seniority_days(today),
            seniority_years: info.seniority_years(today),
            account,
            info,
        })
    }

    async fn update_employee_contact(
        &self,
        user_id: Uuid,
        update: ContactUpdate,
        emergency: EmergencyContact,
    ) -> AppResult<()> {
        with_transaction!(self.uow, |ctx| {
            let accounts = ctx.accounts();
            let account = accounts
                .find_account(user_id)
                .await?
                .ok_or_not_found("Utilisateur")?;
            accounts.update_contact(user_id, update).await?;
            accounts
                .update_emergency_contact(account.profile.id, emergency)
                .await
        })?;

        tracing::info!(%user_id, "employee contact details updated");
        Ok(())
    }
}
