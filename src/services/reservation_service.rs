//! Booking, listing and cancelling table reservations.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

use crate::domain::{NewReservation, ReservationDetails, ReservationError, ReservationRules};
use crate::errors::{AppError, AppResult, FieldErrors};
use crate::infra::UnitOfWork;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ReservationService: Send + Sync {
    /// Book a slot for `user_id`. Rule violations come back as field errors.
    async fn book(&self, user_id: Uuid, request: NewReservation) -> AppResult<ReservationDetails>;

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<ReservationDetails>>;

    /// Cancel one of the user's own reservations.
    async fn cancel(&self, user_id: Uuid, reservation_id: Uuid) -> AppResult<()>;

    fn rules(&self) -> ReservationRules;
}

pub struct ReservationDesk<U: UnitOfWork> {
    uow: Arc<U>,
    rules: ReservationRules,
}

impl<U: UnitOfWork> ReservationDesk<U> {
    pub fn new(uow: Arc<U>, rules: ReservationRules) -> Self {
        Self { uow, rules }
    }
}

#[async_trait]
impl<U: UnitOfWork> ReservationService for ReservationDesk<U> {
    async fn book(&self, user_id: Uuid, request: NewReservation) -> AppResult<ReservationDetails> {
        let Some(table) = self.uow.menu().find_table(request.table_id).await? else {
            return Err(FieldErrors::single("table", "Cette table n'existe pas.").into());
        };

        let today = chrono::Local::now().date_naive();
        let reservations = self.uow.reservations();
        let taken = reservations
            .taken_slots(request.table_id, request.date)
            .await?;

        self.rules
            .validate(today, &request.slot(), &taken)
            .map_err(FieldErrors::from)?;

        // The unique index settles two bookings racing for the same slot.
        let reservation = reservations
            .insert(user_id, request)
            .await
            .map_err(|e| match e {
                AppError::Conflict(_) => FieldErrors::from(vec![ReservationError::SlotTaken]).into(),
                other => other,
            })?;

        tracing::info!(
            reservation_id = %reservation.id,
            table_id = %reservation.table_id,
            date = %reservation.date,
            time = %reservation.time,
            "reservation booked"
        );
        Ok(ReservationDetails {
            reservation,
            table_number: table.number,
            seats: table.seats,
        })
    }

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<ReservationDetails>> {
        self.uow.reservations().list_for_user(user_id).await
    }

    async fn cancel(&self, user_id: Uuid, reservation_id: Uuid) -> AppResult<()> {
        let deleted = self
            .uow
            .reservations()
            .delete_for_user(user_id, reservation_id)
            .await?;

        if !deleted {
            return Err(AppError::NotFound("Réservation"));
        }

        tracing::info!(%reservation_id, "reservation cancelled");
        Ok(())
    }

    fn rules(&self) -> ReservationRules {
        self.rules
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveTime, Utc};
    use mockall::predicate::eq;

    use super::*;
    use crate::domain::{DiningTable, Reservation};
    use crate::services::testing::TestUnitOfWork;

    fn table(id: Uuid) -> DiningTable {
        DiningTable {
            id,
            number: 7,
            seats: 4,
        }
    }

    fn request(table_id: Uuid, days_from_today: i64) -> NewReservation {
        NewReservation {
            table_id,
            date: chrono::Local::now().date_naive() + Duration::days(days_from_today),
            time: NaiveTime::from_hms_opt(20, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_book_returns_table_details() {
        let user_id = Uuid::new_v4();
        let table_id = Uuid::new_v4();

        let mut uow = TestUnitOfWork::default();
        uow.menu
            .expect_find_table()
            .with(eq(table_id))
            .returning(|id| Ok(Some(table(id))));
        uow.reservations
            .expect_taken_slots()
            .returning(|_, _| Ok(Vec::new()));
        uow.reservations
            .expect_insert()
            .times(1)
            .returning(|user_id, request| {
                Ok(Reservation {
                    id: Uuid::new_v4(),
                    user_id,
                    table_id: request.table_id,
                    date: request.date,
                    time: request.time,
                    created_at: Utc::now(),
                })
            });

        let desk = ReservationDesk::new(uow.into_shared(), ReservationRules::default());
        let booked = desk.book(user_id, request(table_id, 2)).await.unwrap();

        assert_eq!(booked.table_number, 7);
        assert_eq!(booked.seats, 4);
        assert_eq!(booked.reservation.user_id, user_id);
    }

    #[tokio::test]
    async fn test_book_in_the_past_never_inserts() {
        let table_id = Uuid::new_v4();

        let mut uow = TestUnitOfWork::default();
        uow.menu
            .expect_find_table()
            .returning(|id| Ok(Some(table(id))));
        uow.reservations
            .expect_taken_slots()
            .returning(|_, _| Ok(Vec::new()));
        uow.reservations.expect_insert().never();

        let desk = ReservationDesk::new(uow.into_shared(), ReservationRules::default());
        let result = desk.book(Uuid::new_v4(), request(table_id, -1)).await;

        let Err(AppError::InvalidFields(fields)) = result else {
            panic!("past date was accepted");
        };
        assert!(fields.get("date").is_some());
    }

    #[tokio::test]
    async fn test_unknown_table_is_a_field_error() {
        let mut uow = TestUnitOfWork::default();
        uow.menu.expect_find_table().returning(|_| Ok(None));

        let desk = ReservationDesk::new(uow.into_shared(), ReservationRules::default());
        let result = desk.book(Uuid::new_v4(), request(Uuid::new_v4(), 1)).await;

        let Err(AppError::InvalidFields(fields)) = result else {
            panic!("unknown table was accepted");
        };
        assert_eq!(
            fields.get("table"),
            Some(&["Cette table n'existe pas.".to_string()][..])
        );
    }

    #[tokio::test]
    async fn test_lost_race_reports_slot_taken() {
        let mut uow = TestUnitOfWork::default();
        uow.menu
            .expect_find_table()
            .returning(|id| Ok(Some(table(id))));
        uow.reservations
            .expect_taken_slots()
            .returning(|_, _| Ok(Vec::new()));
        uow.reservations
            .expect_insert()
            .returning(|_, _| Err(AppError::conflict("duplicate key")));

        let desk = ReservationDesk::new(uow.into_shared(), ReservationRules::default());
        let result = desk.book(Uuid::new_v4(), request(Uuid::new_v4(), 3)).await;

        let Err(AppError::InvalidFields(fields)) = result else {
            panic!("conflict was not mapped");
        };
        assert_eq!(
            fields.get("table"),
            Some(&[ReservationError::SlotTaken.to_string()][..])
        );
    }

    #[tokio::test]
    async fn test_cancel_someone_elses_reservation_is_not_found() {
        let mut uow = TestUnitOfWork::default();
        uow.reservations
            .expect_delete_for_user()
            .returning(|_, _| Ok(false));

        let desk = ReservationDesk::new(uow.into_shared(), ReservationRules::default());
        let result = desk.cancel(Uuid::new_v4(), Uuid::new_v4()).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
