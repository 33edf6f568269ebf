//! Employee records: position, contract, weekly rota and pay.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::money::Money;
use crate::config::{
    DEFAULT_HOURLY_WAGE_CENTS, DEFAULT_SHIFT_END, DEFAULT_SHIFT_START, DEFAULT_WEEKLY_HOURS,
    REST_DAY_LABEL, WEEKS_PER_MONTH,
};
use crate::errors::AppError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    #[default]
    Waiter,
    Cook,
    Chef,
    Dishwasher,
    Manager,
    Cashier,
}

impl Position {
    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Waiter => "waiter",
            Position::Cook => "cook",
            Position::Chef => "chef",
            Position::Dishwasher => "dishwasher",
            Position::Manager => "manager",
            Position::Cashier => "cashier",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Position::Waiter => "Serveur",
            Position::Cook => "Cuisinier",
            Position::Chef => "Chef",
            Position::Dishwasher => "Plongeur",
            Position::Manager => "Manager",
            Position::Cashier => "Caissier",
        }
    }
}

impl FromStr for Position {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "waiter" | "serveur" => Ok(Position::Waiter),
            "cook" | "cuisinier" => Ok(Position::Cook),
            "chef" => Ok(Position::Chef),
            "dishwasher" | "plongeur" => Ok(Position::Dishwasher),
            "manager" => Ok(Position::Manager),
            "cashier" | "caissier" => Ok(Position::Cashier),
            other => Err(AppError::internal(format!("unknown position '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractType {
    #[default]
    Permanent,
    FixedTerm,
    Temp,
    Internship,
}

impl ContractType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractType::Permanent => "permanent",
            ContractType::FixedTerm => "fixed_term",
            ContractType::Temp => "temp",
            ContractType::Internship => "internship",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ContractType::Permanent => "CDI",
            ContractType::FixedTerm => "CDD",
            ContractType::Temp => "Intérim",
            ContractType::Internship => "Stage",
        }
    }
}

impl FromStr for ContractType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "permanent" | "cdi" => Ok(ContractType::Permanent),
            "fixed_term" | "cdd" => Ok(ContractType::FixedTerm),
            "temp" | "interim" => Ok(ContractType::Temp),
            "internship" | "stage" => Ok(ContractType::Internship),
            other => Err(AppError::internal(format!("unknown contract type '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Weekday::Monday => "Lundi",
            Weekday::Tuesday => "Mardi",
            Weekday::Wednesday => "Mercredi",
            Weekday::Thursday => "Jeudi",
            Weekday::Friday => "Vendredi",
            Weekday::Saturday => "Samedi",
            Weekday::Sunday => "Dimanche",
        }
    }

    pub fn is_weekend(&self) -> bool {
        matches!(self, Weekday::Saturday | Weekday::Sunday)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl std::fmt::Display for Shift {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

/// Shifts per day. A day without an entry is a rest day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeeklySchedule(BTreeMap<Weekday, Shift>);

/// One line of the rota as shown to the employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleEntry {
    pub day: Weekday,
    pub label: &'static str,
    pub hours: String,
}

impl WeeklySchedule {
    /// Weekdays 11:30 to 22:30, weekends off.
    pub fn standard() -> Self {
        let shift = Shift {
            start: clock(DEFAULT_SHIFT_START),
            end: clock(DEFAULT_SHIFT_END),
        };
        Self(
            Weekday::ALL
                .into_iter()
                .filter(|day| !day.is_weekend())
                .map(|day| (day, shift))
                .collect(),
        )
    }

    pub fn shift(&self, day: Weekday) -> Option<&Shift> {
        self.0.get(&day)
    }

    pub fn set(&mut self, day: Weekday, shift: Option<Shift>) {
        match shift {
            Some(shift) => self.0.insert(day, shift),
            None => self.0.remove(&day),
        };
    }

    /// All seven days, Monday first, rest days included.
    pub fn entries(&self) -> Vec<ScheduleEntry> {
        Weekday::ALL
            .into_iter()
            .map(|day| ScheduleEntry {
                day,
                label: day.label(),
                hours: self
                    .shift(day)
                    .map(Shift::to_string)
                    .unwrap_or_else(|| REST_DAY_LABEL.to_string()),
            })
            .collect()
    }
}

/// Staff record attached to an employee profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeInfo {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub position: Position,
    pub contract: ContractType,
    pub hire_date: NaiveDate,
    pub hourly_wage: Money,
    pub weekly_hours: f64,
    pub schedule: WeeklySchedule,
    #[serde(skip_serializing)]
    pub social_security_number: Option<String>,
    pub emergency_phone: Option<String>,
    pub emergency_contact: Option<String>,
    pub active: bool,
}

impl EmployeeInfo {
    /// Record created when a profile is promoted to employee.
    pub fn hire(profile_id: Uuid, today: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            profile_id,
            position: Position::default(),
            contract: ContractType::default(),
            hire_date: today,
            hourly_wage: Money::from_cents(DEFAULT_HOURLY_WAGE_CENTS),
            weekly_hours: DEFAULT_WEEKLY_HOURS,
            schedule: WeeklySchedule::standard(),
            social_security_number: None,
            emergency_phone: None,
            emergency_contact: None,
            active: true,
        }
    }

    /// hourly wage × weekly hours × 4.33, rounded to the cent.
    pub fn monthly_salary(&self) -> Money {
        let cents = self.hourly_wage.cents() as f64 * self.weekly_hours * WEEKS_PER_MONTH;
        Money::from_cents(cents.round() as i64)
    }

    pub fn seniority_days(&self, today: NaiveDate) -> i64 {
        (today - self.hire_date).num_days().max(0)
    }

    pub fn seniority_years(&self, today: NaiveDate) -> i64 {
        self.seniority_days(today) / 365
    }
}

pub(crate) fn clock((hour, minute): (u32, u32)) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
}
