//! Table booking, the client's reservations and cancellation.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::flash_failure;
use crate::api::extractors::ValidatedForm;
use crate::api::flash::{FlashRedirect, Flashes};
use crate::api::middleware::{Authorized, ClientOnly};
use crate::api::AppState;
use crate::config::CLIENT_LANDING_PATH;
use crate::domain::{DiningTable, NewReservation};
use crate::errors::{AppError, AppResult, FieldErrors};

const RESERVATIONS_PATH: &str = "/reservations";

/// Booking form
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReservationForm {
    /// Table id
    #[validate(length(min = 1, message = "Choisissez une table."))]
    pub table: String,
    #[validate(length(min = 1, message = "Ce champ est obligatoire."))]
    #[schema(example = "2025-06-21")]
    pub date: String,
    #[validate(length(min = 1, message = "Ce champ est obligatoire."))]
    #[schema(example = "20:00")]
    pub time: String,
}

impl ReservationForm {
    /// Typed request, or one message per unreadable field.
    fn parse(&self) -> AppResult<NewReservation> {
        let mut errors = FieldErrors::new();

        let table_id = Uuid::parse_str(self.table.trim()).ok();
        if table_id.is_none() {
            errors.add("table", "Cette table n'existe pas.");
        }

        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok();
        if date.is_none() {
            errors.add("date", "Date invalide, format attendu AAAA-MM-JJ.");
        }

        let time = parse_time(self.time.trim());
        if time.is_none() {
            errors.add("time", "Heure invalide, format attendu HH:MM.");
        }

        match (table_id, date, time) {
            (Some(table_id), Some(date), Some(time)) => Ok(NewReservation {
                table_id,
                date,
                time,
            }),
            _ => Err(errors.into()),
        }
    }
}

/// `<input type="time">` posts `HH:MM`, some browsers add seconds.
fn parse_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

#[derive(Debug, Serialize)]
pub struct BookingView {
    pub tables: Vec<DiningTable>,
    pub opening: NaiveTime,
    pub closing: NaiveTime,
    pub max_days_ahead: i64,
}

pub fn reservation_routes() -> Router<AppState> {
    Router::new()
        .route(RESERVATIONS_PATH, get(booking_page).post(book))
        .route("/mes_reservations", get(my_reservations))
        .route("/annuler-reservation/:id", post(cancel))
}

/// Tables and booking rules
#[utoipa::path(
    get,
    path = "/reservations",
    tag = "Reservations",
    responses(
        (status = 200, description = "Tables, opening hours and booking window"),
        (status = 303, description = "Not signed in or not a client")
    )
)]
pub async fn booking_page(
    State(state): State<AppState>,
    _client: Authorized<ClientOnly>,
    flashes: Flashes,
) -> AppResult<impl IntoResponse> {
    let reservations = state.reservations();
    let rules = reservations.rules();
    let tables = state.menu().tables().await?;

    Ok(flashes.render(BookingView {
        tables,
        opening: rules.opening,
        closing: rules.closing,
        max_days_ahead: rules.max_days_ahead,
    }))
}

/// Book a table
#[utoipa::path(
    post,
    path = "/reservations",
    tag = "Reservations",
    request_body(content = ReservationForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Booked, back to /reservations with a confirmation"),
        (status = 422, description = "Past date, too far ahead, closed, or slot already taken")
    )
)]
pub async fn book(
    State(state): State<AppState>,
    client: Authorized<ClientOnly>,
    ValidatedForm(form): ValidatedForm<ReservationForm>,
) -> AppResult<FlashRedirect> {
    let request = form.parse()?;
    let booked = state.reservations().book(client.user_id, request).await?;

    Ok(FlashRedirect::success(
        RESERVATIONS_PATH,
        format!(
            "Réservation confirmée pour la table {} le {} à {}.",
            booked.table_number,
            booked.reservation.date.format("%d/%m/%Y"),
            booked.reservation.time.format("%H:%M"),
        ),
    ))
}

/// The client's reservations, latest first
#[utoipa::path(
    get,
    path = "/mes_reservations",
    tag = "Reservations",
    responses(
        (status = 200, description = "Own reservations with their table"),
        (status = 303, description = "Not signed in or not a client")
    )
)]
pub async fn my_reservations(
    State(state): State<AppState>,
    client: Authorized<ClientOnly>,
    flashes: Flashes,
) -> AppResult<impl IntoResponse> {
    let reservations = state.reservations().list_for_user(client.user_id).await?;
    Ok(flashes.render(reservations))
}

/// Cancel one of the client's reservations
#[utoipa::path(
    post,
    path = "/annuler-reservation/{id}",
    tag = "Reservations",
    params(("id" = String, Path, description = "Reservation id")),
    responses((status = 303, description = "Back to /mon_compte with the outcome"))
)]
pub async fn cancel(
    State(state): State<AppState>,
    client: Authorized<ClientOnly>,
    Path(id): Path<String>,
) -> AppResult<FlashRedirect> {
    let Ok(reservation_id) = Uuid::parse_str(&id) else {
        return Ok(FlashRedirect::error(CLIENT_LANDING_PATH, "Réservation introuvable."));
    };

    match state.reservations().cancel(client.user_id, reservation_id).await {
        Ok(()) => Ok(FlashRedirect::success(
            CLIENT_LANDING_PATH,
            "Votre réservation a été annulée avec succès.",
        )),
        Err(AppError::NotFound(_)) => Ok(FlashRedirect::error(
            CLIENT_LANDING_PATH,
            "Réservation introuvable.",
        )),
        Err(e) => flash_failure(e, CLIENT_LANDING_PATH),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(table: &str, date: &str, time: &str) -> ReservationForm {
        ReservationForm {
            table: table.to_string(),
            date: date.to_string(),
            time: time.to_string(),
        }
    }

    #[test]
    fn test_form_parses_browser_values() {
        let table = Uuid::new_v4();

        let request = form(&table.to_string(), "2025-06-21", "20:30").parse().unwrap();
        assert_eq!(request.table_id, table);
        assert_eq!(request.date, NaiveDate::from_ymd_opt(2025, 6, 21).unwrap());
        assert_eq!(request.time, NaiveTime::from_hms_opt(20, 30, 0).unwrap());

        let with_seconds = form(&table.to_string(), "2025-06-21", "20:30:00").parse().unwrap();
        assert_eq!(with_seconds.time, request.time);
    }

    #[test]
    fn test_unreadable_fields_are_all_reported() {
        let Err(AppError::InvalidFields(fields)) = form("12", "21/06/2025", "8pm").parse() else {
            panic!("garbage form was accepted");
        };

        assert!(fields.get("table").is_some());
        assert!(fields.get("date").is_some());
        assert!(fields.get("time").is_some());
    }
}
