//! Bistrot - restaurant management service.
//!
//! Menu browsing, table reservations, orders with loyalty points, customer
//! reviews and the staff console, served as an Axum application over
//! PostgreSQL.
//!
//! # Layers
//!
//! - **cli** / **commands**: command line and its commands
//! - **config**: settings from the environment and constants
//! - **domain**: entities and business rules, free of I/O
//! - **infra**: database, migrations, repositories, Unit of Work
//! - **services**: use cases behind traits
//! - **api**: handlers, session and flash handling, routes
//! - **types**: pagination and page envelopes
//! - **errors**: the application error type
//!
//! # CLI Usage
//!
//! ```bash
//! # Apply migrations, then create tables and a starter menu
//! cargo run -- migrate up
//! cargo run -- seed
//!
//! # Start the server
//! cargo run -- serve --port 8080
//!
//! # Give someone access to the staff console
//! cargo run -- staff promote marie
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

pub use api::AppState;
pub use config::Config;
pub use errors::{AppError, AppResult};
