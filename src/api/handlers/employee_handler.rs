//! Staff console: employee record, orders to serve, status changes.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
    Form, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::account_handler::PROFILE_UPDATED;
use super::{flash_failure, non_blank};
use crate::api::extractors::ValidatedForm;
use crate::api::flash::{FlashRedirect, Flashes};
use crate::api::middleware::{Authorized, EmployeeOnly};
use crate::api::AppState;
use crate::config::EMPLOYEE_LANDING_PATH;
use crate::domain::{ContactUpdate, EmergencyContact, OrderDetails, OrderStatus};
use crate::errors::{AppError, AppResult};
use crate::services::{parallel, EmployeeRecord};

/// Employee contact form
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct EmployeeContactForm {
    #[serde(default)]
    #[validate(length(max = 150, message = "150 caractères au maximum."))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(max = 150, message = "150 caractères au maximum."))]
    pub last_name: String,
    #[validate(email(message = "Adresse email invalide."))]
    pub email: String,
    #[validate(length(max = 20, message = "20 caractères au maximum."))]
    pub phone: Option<String>,
    #[validate(length(max = 20, message = "20 caractères au maximum."))]
    pub telephone_urgence: Option<String>,
    #[validate(length(max = 100, message = "100 caractères au maximum."))]
    pub contact_urgence: Option<String>,
}

/// Status change form
#[derive(Debug, Deserialize, ToSchema)]
pub struct StatusForm {
    #[serde(default)]
    #[schema(example = "preparing")]
    pub statut: String,
}

#[derive(Debug, Serialize)]
pub struct StatusOption {
    pub code: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct EmployeeConsole {
    #[serde(flatten)]
    pub record: EmployeeRecord,
    pub orders_to_serve: Vec<OrderDetails>,
    pub statuses: Vec<StatusOption>,
}

pub fn employee_routes() -> Router<AppState> {
    Router::new()
        .route(EMPLOYEE_LANDING_PATH, get(employee_account))
        .route("/update-employe-info", post(update_employee_info))
        .route("/changer_statut_commande/:id", post(change_order_status))
}

/// Employee record, weekly schedule, pay and orders to serve
#[utoipa::path(
    get,
    path = "/mon_compte_employe",
    tag = "Staff",
    responses(
        (status = 200, description = "Employee record with the orders still pending or in preparation"),
        (status = 303, description = "Not signed in or not an employee")
    )
)]
pub async fn employee_account(
    State(state): State<AppState>,
    employee: Authorized<EmployeeOnly>,
    flashes: Flashes,
) -> AppResult<impl IntoResponse> {
    let accounts = state.accounts();
    let orders = state.orders();
    let (record, orders_to_serve) = parallel::join2(
        accounts.employee_record(employee.user_id),
        orders.orders_to_serve(),
    )
    .await?;

    let statuses = [
        OrderStatus::Pending,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ]
    .into_iter()
    .map(|status| StatusOption {
        code: status.as_str(),
        label: status.label(),
    })
    .collect();

    Ok(flashes.render(EmployeeConsole {
        record,
        orders_to_serve,
        statuses,
    }))
}

/// Update the employee's contact and emergency contact
#[utoipa::path(
    post,
    path = "/update-employe-info",
    tag = "Staff",
    request_body(content = EmployeeContactForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Saved, back to /mon_compte_employe"),
        (status = 422, description = "Field errors")
    )
)]
pub async fn update_employee_info(
    State(state): State<AppState>,
    employee: Authorized<EmployeeOnly>,
    ValidatedForm(form): ValidatedForm<EmployeeContactForm>,
) -> AppResult<FlashRedirect> {
    let contact = ContactUpdate {
        first_name: form.first_name.trim().to_string(),
        last_name: form.last_name.trim().to_string(),
        email: form.email.trim().to_string(),
        phone: non_blank(form.phone),
    };
    let emergency = EmergencyContact {
        phone: non_blank(form.telephone_urgence),
        name: non_blank(form.contact_urgence),
    };

    state
        .accounts()
        .update_employee_contact(employee.user_id, contact, emergency)
        .await?;

    Ok(FlashRedirect::success(EMPLOYEE_LANDING_PATH, PROFILE_UPDATED))
}

/// Move an order along its lifecycle
#[utoipa::path(
    post,
    path = "/changer_statut_commande/{id}",
    tag = "Staff",
    params(("id" = String, Path, description = "Order id")),
    request_body(content = StatusForm, content_type = "application/x-www-form-urlencoded"),
    responses((status = 303, description = "Back to /mon_compte_employe with the outcome"))
)]
pub async fn change_order_status(
    State(state): State<AppState>,
    employee: Authorized<EmployeeOnly>,
    Path(id): Path<String>,
    Form(form): Form<StatusForm>,
) -> AppResult<FlashRedirect> {
    let Ok(order_id) = Uuid::parse_str(&id) else {
        return Ok(FlashRedirect::error(EMPLOYEE_LANDING_PATH, "Commande introuvable."));
    };
    let Ok(status) = form.statut.parse::<OrderStatus>() else {
        return Ok(FlashRedirect::error(EMPLOYEE_LANDING_PATH, "Statut invalide."));
    };

    match state
        .orders()
        .change_status(employee.actor.clone(), order_id, status)
        .await
    {
        Ok(order) => Ok(FlashRedirect::success(
            EMPLOYEE_LANDING_PATH,
            format!(
                "Commande #{} passée en « {} ».",
                short_id(order.id),
                order.status.label()
            ),
        )),
        Err(AppError::NotFound(_)) => Ok(FlashRedirect::error(
            EMPLOYEE_LANDING_PATH,
            "Commande introuvable.",
        )),
        Err(e) => flash_failure(e, EMPLOYEE_LANDING_PATH),
    }
}

/// First block of a UUID, enough to tell orders apart on screen.
fn short_id(id: Uuid) -> String {
    id.simple().to_string()[..8].to_string()
}
