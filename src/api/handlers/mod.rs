//! HTTP request handlers.
//!
//! Pages answer with a JSON `Page`; form posts answer with a `FlashRedirect`.

pub mod account_handler;
pub mod auth_handler;
pub mod employee_handler;
pub mod order_handler;
pub mod public_handler;
pub mod reservation_handler;
pub mod review_handler;

pub use account_handler::account_routes;
pub use auth_handler::auth_routes;
pub use employee_handler::employee_routes;
pub use order_handler::order_routes;
pub use public_handler::public_routes;
pub use reservation_handler::reservation_routes;
pub use review_handler::review_routes;

use crate::api::flash::FlashRedirect;
use crate::errors::{AppError, AppResult};

/// Send a refused form back to `back` with the reason; server failures propagate.
fn flash_failure(error: AppError, back: &str) -> AppResult<FlashRedirect> {
    if error.is_client_error() {
        tracing::debug!(code = error.code(), "form refused");
        Ok(FlashRedirect::error(back, error.notice_text()))
    } else {
        Err(error)
    }
}

/// Browsers post untouched inputs as empty strings.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
