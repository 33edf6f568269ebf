//! Users, their profile and the authenticated actor.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{
    CLIENT_LANDING_PATH, EMPLOYEE_LANDING_PATH, ROLE_CLIENT, ROLE_EMPLOYEE,
};
use crate::errors::AppError;

/// Role stored on a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Client,
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => ROLE_CLIENT,
            Role::Employee => ROLE_EMPLOYEE,
        }
    }

    /// Page an actor of this role lands on after login or a denied request.
    pub fn landing_path(&self) -> &'static str {
        match self {
            Role::Client => CLIENT_LANDING_PATH,
            Role::Employee => EMPLOYEE_LANDING_PATH,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            ROLE_CLIENT => Ok(Role::Client),
            ROLE_EMPLOYEE | "employe" | "employé" => Ok(Role::Employee),
            other => Err(AppError::field("role", format!("Rôle inconnu : {}", other))),
        }
    }
}

/// Login identity.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// "First Last", or the username when no name was given.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

/// Per-user record holding the role and the loyalty balance.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub role: Role,
    pub phone: Option<String>,
    pub points: i64,
    pub created_at: DateTime<Utc>,
}

/// A user together with their profile.
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    pub user: User,
    pub profile: Profile,
}

impl Account {
    pub fn actor(&self) -> Actor {
        Actor {
            user_id: self.user.id,
            username: self.user.username.clone(),
            role: self.profile.role,
        }
    }
}

/// The authenticated principal of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Actor {
    pub user_id: Uuid,
    pub username: String,
    pub role: Role,
}

impl Actor {
    pub fn is_employee(&self) -> bool {
        self.role == Role::Employee
    }
}

/// Data needed to insert a user row.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
}

static USERNAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.@+-]+$").expect("username pattern is a valid regex"));

/// Letters, digits and `@ . + - _` only.
pub fn username_problem(username: &str) -> Option<&'static str> {
    if USERNAME_CHARS.is_match(username) {
        None
    } else {
        Some("Lettres, chiffres et caractères @ . + - _ uniquement.")
    }
}

/// Registration request as accepted by the auth service.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    pub role: Role,
}

/// Editable identity and contact fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactUpdate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// Person to call for an employee.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmergencyContact {
    pub phone: Option<String>,
    pub name: Option<String>,
}
