//! Table reservations.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, SqlErr,
};
use uuid::Uuid;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

use super::entities::{dining_table, reservation};
use crate::domain::{
    NewReservation, Reservation, ReservationDetails, ReservationError, Slot,
};
use crate::errors::{AppError, AppResult};

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Slots already held on `table_id` for `date`.
    async fn taken_slots(&self, table_id: Uuid, date: NaiveDate) -> AppResult<Vec<Slot>>;

    /// Insert a reservation; a slot that is already held yields `AppError::Conflict`.
    async fn insert(&self, user_id: Uuid, request: NewReservation) -> AppResult<Reservation>;

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<ReservationDetails>>;

    /// Delete the user's reservation; `false` when it does not exist or is not theirs.
    async fn delete_for_user(&self, user_id: Uuid, reservation_id: Uuid) -> AppResult<bool>;
}

pub struct ReservationQueries<'c, C> {
    conn: &'c C,
}

impl<'c, C: ConnectionTrait> ReservationQueries<'c, C> {
    pub fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    pub async fn taken_slots(&self, table_id: Uuid, date: NaiveDate) -> AppResult<Vec<Slot>> {
        let models = reservation::Entity::find()
            .filter(reservation::Column::TableId.eq(table_id))
            .filter(reservation::Column::Date.eq(date))
            .all(self.conn)
            .await?;

        Ok(models
            .into_iter()
            .map(|model| Reservation::from(model).slot())
            .collect())
    }

    pub async fn insert(&self, user_id: Uuid, request: NewReservation) -> AppResult<Reservation> {
        let model = reservation::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            table_id: Set(request.table_id),
            date: Set(request.date),
            time: Set(request.time),
            created_at: Set(Utc::now()),
        }
        .insert(self.conn)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                AppError::conflict(ReservationError::SlotTaken.to_string())
            }
            _ => AppError::from(e),
        })?;

        Ok(Reservation::from(model))
    }

    /// Most recent first.
    pub async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<ReservationDetails>> {
        let rows = reservation::Entity::find()
            .filter(reservation::Column::UserId.eq(user_id))
            .find_also_related(dining_table::Entity)
            .order_by_desc(reservation::Column::Date)
            .order_by_desc(reservation::Column::Time)
            .all(self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(reservation, table)| {
                let (table_number, seats) = table.map(|t| (t.number, t.seats)).unwrap_or((0, 0));
                ReservationDetails {
                    reservation: Reservation::from(reservation),
                    table_number,
                    seats,
                }
            })
            .collect())
    }

    pub async fn delete_for_user(&self, user_id: Uuid, reservation_id: Uuid) -> AppResult<bool> {
        let result = reservation::Entity::delete_many()
            .filter(reservation::Column::Id.eq(reservation_id))
            .filter(reservation::Column::UserId.eq(user_id))
            .exec(self.conn)
            .await?;

        Ok(result.rows_affected > 0)
    }
}

pub struct ReservationStore {
    db: DatabaseConnection,
}

impl ReservationStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn queries(&self) -> ReservationQueries<'_, DatabaseConnection> {
        ReservationQueries::new(&self.db)
    }
}

#[async_trait]
impl ReservationRepository for ReservationStore {
    async fn taken_slots(&self, table_id: Uuid, date: NaiveDate) -> AppResult<Vec<Slot>> {
        self.queries().taken_slots(table_id, date).await
    }

    async fn insert(&self, user_id: Uuid, request: NewReservation) -> AppResult<Reservation> {
        self.queries().insert(user_id, request).await
    }

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<ReservationDetails>> {
        self.queries().list_for_user(user_id).await
    }

    async fn delete_for_user(&self, user_id: Uuid, reservation_id: Uuid) -> AppResult<bool> {
        self.queries().delete_for_user(user_id, reservation_id).await
    }
}
