//! Application settings loaded from environment variables.

use std::env;
use std::str::FromStr;

use super::constants::{
    DEFAULT_DATABASE_MAX_CONNECTIONS, DEFAULT_DATABASE_URL, DEFAULT_RESTAURANT_NAME,
    DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT, DEFAULT_SESSION_HOURS, MIN_SESSION_SECRET_LENGTH,
};
use crate::domain::{LoyaltyPolicy, Money, ReservationRules, ReviewHeuristics};

/// Application configuration, built once at startup and handed to every service.
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    session_secret: String,
    pub session_hours: i64,
    pub server_host: String,
    pub server_port: u16,
    /// Mark session cookies `Secure` (HTTPS deployments)
    pub secure_cookies: bool,
    /// Allow `/register` to create employee accounts directly
    pub open_staff_signup: bool,
    pub restaurant_name: String,
    pub reservations: ReservationRules,
    pub reviews: ReviewHeuristics,
    pub loyalty: LoyaltyPolicy,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("database_max_connections", &self.database_max_connections)
            .field("session_secret", &"[REDACTED]")
            .field("session_hours", &self.session_hours)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("secure_cookies", &self.secure_cookies)
            .field("open_staff_signup", &self.open_staff_signup)
            .field("restaurant_name", &self.restaurant_name)
            .field("reservations", &self.reservations)
            .field("reviews", &self.reviews)
            .field("loyalty", &self.loyalty)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Panics
    /// Panics if SESSION_SECRET is missing in a release build or is too short.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let session_secret = env::var("SESSION_SECRET").unwrap_or_else(|_| {
            if cfg!(debug_assertions) {
                tracing::warn!("SESSION_SECRET not set, using insecure default for development");
                "dev-session-secret-minimum-32-chars!".to_string()
            } else {
                panic!("SESSION_SECRET environment variable must be set in production");
            }
        });

        if session_secret.len() < MIN_SESSION_SECRET_LENGTH {
            panic!(
                "SESSION_SECRET must be at least {} characters long",
                MIN_SESSION_SECRET_LENGTH
            );
        }

        let defaults = ReservationRules::default();
        let reservations = ReservationRules {
            max_days_ahead: parsed("RESERVATION_MAX_DAYS_AHEAD").unwrap_or(defaults.max_days_ahead),
            opening: parsed("RESERVATION_OPENING").unwrap_or(defaults.opening),
            closing: parsed("RESERVATION_CLOSING").unwrap_or(defaults.closing),
        };

        let defaults = ReviewHeuristics::default();
        let reviews = ReviewHeuristics {
            min_length: parsed("REVIEW_MIN_LENGTH").unwrap_or(defaults.min_length),
            max_consonant_run: parsed("REVIEW_MAX_CONSONANT_RUN")
                .unwrap_or(defaults.max_consonant_run),
            max_single_word: parsed("REVIEW_MAX_SINGLE_WORD").unwrap_or(defaults.max_single_word),
            max_repeat: parsed("REVIEW_MAX_REPEAT").unwrap_or(defaults.max_repeat),
            max_consonant_ratio: parsed("REVIEW_MAX_CONSONANT_RATIO")
                .unwrap_or(defaults.max_consonant_ratio),
        };

        let loyalty = parsed::<i64>("LOYALTY_SPEND_PER_POINT_CENTS")
            .filter(|cents| *cents > 0)
            .map(|cents| LoyaltyPolicy::new(Money::from_cents(cents)))
            .unwrap_or_default();

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            database_max_connections: parsed("DATABASE_MAX_CONNECTIONS")
                .unwrap_or(DEFAULT_DATABASE_MAX_CONNECTIONS),
            session_secret,
            session_hours: parsed("SESSION_HOURS").unwrap_or(DEFAULT_SESSION_HOURS),
            server_host: env::var("SERVER_HOST")
                .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            server_port: parsed("SERVER_PORT").unwrap_or(DEFAULT_SERVER_PORT),
            secure_cookies: parsed("SECURE_COOKIES").unwrap_or(false),
            open_staff_signup: parsed("OPEN_STAFF_SIGNUP").unwrap_or(false),
            restaurant_name: env::var("RESTAURANT_NAME")
                .unwrap_or_else(|_| DEFAULT_RESTAURANT_NAME.to_string()),
            reservations,
            reviews,
            loyalty,
        }
    }

    /// Configuration for tests and tooling, with an explicit session secret.
    pub fn with_secret(database_url: impl Into<String>, session_secret: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            database_max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
            session_secret: session_secret.into(),
            session_hours: DEFAULT_SESSION_HOURS,
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            secure_cookies: false,
            open_staff_signup: false,
            restaurant_name: DEFAULT_RESTAURANT_NAME.to_string(),
            reservations: ReservationRules::default(),
            reviews: ReviewHeuristics::default(),
            loyalty: LoyaltyPolicy::default(),
        }
    }

    /// Get session secret bytes for token signing/verification.
    pub fn session_secret_bytes(&self) -> &[u8] {
        self.session_secret.as_bytes()
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parsed<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
