//! Table reservations and the booking rules.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use super::employee::clock;
use crate::config::{DEFAULT_CLOSING_TIME, DEFAULT_OPENING_TIME, DEFAULT_RESERVATION_DAYS_AHEAD};
use crate::errors::FieldErrors;

/// A (table, date, time) triple. At most one reservation holds a given slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot {
    pub table_id: Uuid,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reservation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub table_id: Uuid,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub created_at: DateTime<Utc>,
}

impl Reservation {
    pub fn slot(&self) -> Slot {
        Slot {
            table_id: self.table_id,
            date: self.date,
            time: self.time,
        }
    }
}

/// Reservation with the table it holds, for listings.
#[derive(Debug, Clone, Serialize)]
pub struct ReservationDetails {
    #[serde(flatten)]
    pub reservation: Reservation,
    pub table_number: i32,
    pub seats: i32,
}

/// Booking request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewReservation {
    pub table_id: Uuid,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl NewReservation {
    pub fn slot(&self) -> Slot {
        Slot {
            table_id: self.table_id,
            date: self.date,
            time: self.time,
        }
    }
}

/// One violated booking rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReservationError {
    #[error("La date ne peut pas être dans le passé.")]
    PastDate,

    #[error("Les réservations sont possibles au maximum {max_days} jours à l'avance.")]
    TooFarAhead { max_days: i64 },

    #[error("Les réservations sont acceptées entre {} et {}.", .opening.format("%H:%M"), .closing.format("%H:%M"))]
    OutsideOpeningHours {
        opening: NaiveTime,
        closing: NaiveTime,
    },

    #[error("Cette table est déjà réservée à cette date et cette heure.")]
    SlotTaken,
}

impl ReservationError {
    /// Form field the message belongs to.
    pub fn field(&self) -> &'static str {
        match self {
            ReservationError::PastDate | ReservationError::TooFarAhead { .. } => "date",
            ReservationError::OutsideOpeningHours { .. } => "time",
            ReservationError::SlotTaken => "table",
        }
    }
}

impl From<Vec<ReservationError>> for FieldErrors {
    fn from(errors: Vec<ReservationError>) -> Self {
        let mut fields = FieldErrors::new();
        for error in errors {
            fields.add(error.field(), error.to_string());
        }
        fields
    }
}

/// Booking window and opening hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReservationRules {
    pub max_days_ahead: i64,
    pub opening: NaiveTime,
    pub closing: NaiveTime,
}

impl Default for ReservationRules {
    fn default() -> Self {
        Self {
            max_days_ahead: DEFAULT_RESERVATION_DAYS_AHEAD,
            opening: clock(DEFAULT_OPENING_TIME),
            closing: clock(DEFAULT_CLOSING_TIME),
        }
    }
}

impl ReservationRules {
    /// Date and time rules only; every violated rule is reported.
    pub fn check_window(
        &self,
        today: NaiveDate,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Vec<ReservationError> {
        let mut errors = Vec::new();

        if date < today {
            errors.push(ReservationError::PastDate);
        } else if date > today + Duration::days(self.max_days_ahead) {
            errors.push(ReservationError::TooFarAhead {
                max_days: self.max_days_ahead,
            });
        }

        if time < self.opening || time > self.closing {
            errors.push(ReservationError::OutsideOpeningHours {
                opening: self.opening,
                closing: self.closing,
            });
        }

        errors
    }

    /// Accept `slot` if it is inside the window and not among `existing`.
    ///
    /// The conflict check only runs once the window rules pass.
    pub fn validate(
        &self,
        today: NaiveDate,
        slot: &Slot,
        existing: &[Slot],
    ) -> Result<(), Vec<ReservationError>> {
        let errors = self.check_window(today, slot.date, slot.time);
        if !errors.is_empty() {
            return Err(errors);
        }

        if existing.contains(slot) {
            return Err(vec![ReservationError::SlotTaken]);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    fn at(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    fn slot(days: i64, time: NaiveTime) -> Slot {
        Slot {
            table_id: Uuid::nil(),
            date: today() + Duration::days(days),
            time,
        }
    }

    #[test]
    fn test_window_bounds_are_inclusive() {
        let rules = ReservationRules::default();

        assert!(rules.validate(today(), &slot(0, at(12, 0)), &[]).is_ok());
        assert!(rules.validate(today(), &slot(31, at(22, 0)), &[]).is_ok());
    }

    #[test]
    fn test_past_date_rejected() {
        let rules = ReservationRules::default();

        assert_eq!(
            rules.validate(today(), &slot(-1, at(19, 30)), &[]),
            Err(vec![ReservationError::PastDate])
        );
    }

    #[test]
    fn test_too_far_ahead_rejected() {
        let rules = ReservationRules::default();

        assert_eq!(
            rules.validate(today(), &slot(32, at(19, 30)), &[]),
            Err(vec![ReservationError::TooFarAhead { max_days: 31 }])
        );
    }

    #[test]
    fn test_outside_opening_hours_rejected() {
        let rules = ReservationRules::default();

        for time in [at(11, 59), at(22, 1), at(8, 0)] {
            let errors = rules.validate(today(), &slot(1, time), &[]).unwrap_err();
            assert!(matches!(
                errors[0],
                ReservationError::OutsideOpeningHours { .. }
            ));
        }
    }

    #[test]
    fn test_every_violated_rule_is_reported() {
        let rules = ReservationRules::default();

        let errors = rules.validate(today(), &slot(-3, at(23, 0)), &[]).unwrap_err();

        assert_eq!(errors.len(), 2);
        let fields: FieldErrors = errors.into();
        assert!(fields.get("date").is_some());
        assert!(fields.get("time").is_some());
    }

    #[test]
    fn test_taken_slot_rejected() {
        let rules = ReservationRules::default();
        let wanted = slot(2, at(20, 0));
        let other_table = Slot {
            table_id: Uuid::new_v4(),
            ..wanted
        };

        assert!(rules.validate(today(), &wanted, &[other_table]).is_ok());
        assert_eq!(
            rules.validate(today(), &wanted, &[other_table, wanted]),
            Err(vec![ReservationError::SlotTaken])
        );
    }

    #[test]
    fn test_opening_hours_message_shows_bounds() {
        let error = ReservationError::OutsideOpeningHours {
            opening: at(12, 0),
            closing: at(22, 0),
        };

        assert_eq!(
            error.to_string(),
            "Les réservations sont acceptées entre 12:00 et 22:00."
        );
    }
}
