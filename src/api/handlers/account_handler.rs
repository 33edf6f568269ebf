//! Client account page and profile update.

use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use super::non_blank;
use crate::api::extractors::ValidatedForm;
use crate::api::flash::{FlashRedirect, Flashes};
use crate::api::middleware::{Authorized, ClientOnly};
use crate::api::AppState;
use crate::config::CLIENT_LANDING_PATH;
use crate::domain::ContactUpdate;
use crate::errors::AppResult;

pub const PROFILE_UPDATED: &str = "Vos informations ont été mises à jour avec succès !";

/// Identity and contact form
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ContactForm {
    #[serde(default)]
    #[validate(length(max = 150, message = "150 caractères au maximum."))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(max = 150, message = "150 caractères au maximum."))]
    pub last_name: String,
    #[validate(email(message = "Adresse email invalide."))]
    #[schema(example = "jeanne@dupont.fr")]
    pub email: String,
    #[validate(length(max = 20, message = "20 caractères au maximum."))]
    #[schema(example = "06 12 34 56 78")]
    pub phone: Option<String>,
}

impl From<ContactForm> for ContactUpdate {
    fn from(form: ContactForm) -> Self {
        ContactUpdate {
            first_name: form.first_name.trim().to_string(),
            last_name: form.last_name.trim().to_string(),
            email: form.email.trim().to_string(),
            phone: non_blank(form.phone),
        }
    }
}

pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/mon_compte", get(client_account))
        .route("/update-profile", post(update_profile))
}

/// Client dashboard: orders, reservations, reviews and points
#[utoipa::path(
    get,
    path = "/mon_compte",
    tag = "Account",
    responses(
        (status = 200, description = "Account, orders, reservations, reviews and loyalty balance"),
        (status = 303, description = "Not signed in or not a client")
    )
)]
pub async fn client_account(
    State(state): State<AppState>,
    client: Authorized<ClientOnly>,
    flashes: Flashes,
) -> AppResult<impl IntoResponse> {
    let dashboard = state.accounts().client_dashboard(client.user_id).await?;
    Ok(flashes.render(dashboard))
}

/// Update the client's identity and phone
#[utoipa::path(
    post,
    path = "/update-profile",
    tag = "Account",
    request_body(content = ContactForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Saved, back to /mon_compte"),
        (status = 422, description = "Field errors")
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    client: Authorized<ClientOnly>,
    ValidatedForm(form): ValidatedForm<ContactForm>,
) -> AppResult<FlashRedirect> {
    state
        .accounts()
        .update_contact(client.user_id, form.into())
        .await?;

    Ok(FlashRedirect::success(CLIENT_LANDING_PATH, PROFILE_UPDATED))
}
