//! Ordering: the quantity form, the JSON cart, the checkout page and the
//! client's order history. All three entry points end in the same placement.

use std::collections::HashMap;

use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Form, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{flash_failure, non_blank};
use crate::api::extractors::ValidatedForm;
use crate::api::flash::{FlashRedirect, Flashes};
use crate::api::middleware::{Authorized, ClientOnly};
use crate::api::AppState;
use crate::domain::{parse_cart, CartItem, MenuSection, PaymentMode, PlaceOrder};
use crate::errors::AppResult;

const ORDER_FORM_PATH: &str = "/commander";
const CHECKOUT_PATH: &str = "/panier";
const ORDERS_PATH: &str = "/mes-commandes";

const QUANTITY_PREFIX: &str = "quantite_";

/// Quantity form: one `quantite_<dish id>` field per dish plus the fields below
#[derive(Debug, Deserialize, ToSchema)]
pub struct QuantityForm {
    #[schema(example = "cash")]
    pub mode_paiement: Option<String>,
    pub telephone: Option<String>,
    pub adresse: Option<String>,
}

/// JSON cart posted by the menu page's basket
#[derive(Debug, Deserialize, ToSchema)]
pub struct CartForm {
    /// `[{"id": "<dish id>", "quantite": 2}, ...]`
    #[serde(default)]
    pub panier_json: String,
}

/// Checkout form
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CheckoutForm {
    #[serde(default = "default_payment")]
    #[schema(example = "card")]
    pub mode_paiement: String,
    #[validate(length(min = 1, max = 20, message = "Indiquez un numéro de téléphone."))]
    #[schema(example = "06 12 34 56 78")]
    pub telephone: String,
    pub adresse_livraison: Option<String>,
    /// Same payload as `panier_json`
    pub panier_data: Option<String>,
}

fn default_payment() -> String {
    PaymentMode::default().as_str().to_string()
}

#[derive(Debug, Serialize)]
pub struct PaymentOption {
    pub code: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct OrderFormView {
    pub sections: Vec<MenuSection>,
    pub payment_modes: Vec<PaymentOption>,
}

#[derive(Debug, Serialize)]
pub struct CheckoutView {
    pub payment_modes: Vec<PaymentOption>,
}

fn payment_options() -> Vec<PaymentOption> {
    PaymentMode::ALL
        .iter()
        .map(|mode| PaymentOption {
            code: mode.as_str(),
            label: mode.label(),
        })
        .collect()
}

/// Cart from `quantite_<dish id>` fields; unreadable quantities count as zero.
fn quantity_cart(fields: &HashMap<String, String>) -> Vec<CartItem> {
    let mut items: Vec<CartItem> = fields
        .iter()
        .filter_map(|(name, value)| {
            let dish_id = Uuid::parse_str(name.strip_prefix(QUANTITY_PREFIX)?).ok()?;
            let quantity = value.trim().parse::<u32>().unwrap_or(0);
            Some(CartItem { dish_id, quantity })
        })
        .collect();
    items.sort_by_key(|item| item.dish_id);
    items
}

/// A payload that cannot be read is an empty cart.
fn cart_or_empty(raw: &str) -> Vec<CartItem> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    parse_cart(raw).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "unreadable cart payload");
        Vec::new()
    })
}

pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route(ORDER_FORM_PATH, get(order_form).post(order_quantities))
        .route("/commander/valider", post(order_cart))
        .route(CHECKOUT_PATH, get(checkout_page).post(checkout))
        .route(ORDERS_PATH, get(my_orders))
}

async fn place(
    state: &AppState,
    user_id: Uuid,
    request: PlaceOrder,
    back: &str,
) -> AppResult<FlashRedirect> {
    match state.orders().place_order(user_id, request).await {
        Ok(placed) => Ok(FlashRedirect::success(
            ORDERS_PATH,
            format!(
                "Commande validée ! Montant total : {} €. Vous avez gagné {} points (solde : {}).",
                placed.order.total, placed.order.points_earned, placed.points_balance
            ),
        )),
        Err(e) => flash_failure(e, back),
    }
}

/// Menu with quantity inputs
#[utoipa::path(
    get,
    path = "/commander",
    tag = "Orders",
    responses(
        (status = 200, description = "Available dishes by course and payment modes"),
        (status = 303, description = "Not signed in or not a client")
    )
)]
pub async fn order_form(
    State(state): State<AppState>,
    _client: Authorized<ClientOnly>,
    flashes: Flashes,
) -> AppResult<impl IntoResponse> {
    let sections = state.menu().menu().await?;
    Ok(flashes.render(OrderFormView {
        sections,
        payment_modes: payment_options(),
    }))
}

/// Order from the quantity form
///
/// Fields: `quantite_<dish id>` per dish, `mode_paiement`, `telephone`, `adresse`.
#[utoipa::path(
    post,
    path = "/commander",
    tag = "Orders",
    request_body(content = QuantityForm, content_type = "application/x-www-form-urlencoded"),
    responses((status = 303, description = "Placed: to /mes-commandes; refused: back to /commander with the reason"))
)]
pub async fn order_quantities(
    State(state): State<AppState>,
    client: Authorized<ClientOnly>,
    Form(fields): Form<HashMap<String, String>>,
) -> AppResult<FlashRedirect> {
    let payment_mode = match fields.get("mode_paiement").map(|m| m.parse::<PaymentMode>()) {
        None => PaymentMode::default(),
        Some(Ok(mode)) => mode,
        Some(Err(e)) => return flash_failure(e, ORDER_FORM_PATH),
    };

    let request = PlaceOrder {
        items: quantity_cart(&fields),
        payment_mode,
        phone: fields
            .get("telephone")
            .map(|p| p.trim().to_string())
            .unwrap_or_default(),
        delivery_address: non_blank(fields.get("adresse").cloned()),
    };

    place(&state, client.user_id, request, ORDER_FORM_PATH).await
}

/// Order the basket built on the menu page, paid by card
#[utoipa::path(
    post,
    path = "/commander/valider",
    tag = "Orders",
    request_body(content = CartForm, content_type = "application/x-www-form-urlencoded"),
    responses((status = 303, description = "Placed: to /mes-commandes; empty or unreadable cart: back to /commander"))
)]
pub async fn order_cart(
    State(state): State<AppState>,
    client: Authorized<ClientOnly>,
    Form(form): Form<CartForm>,
) -> AppResult<FlashRedirect> {
    let request = PlaceOrder {
        items: cart_or_empty(&form.panier_json),
        payment_mode: PaymentMode::Card,
        phone: String::new(),
        delivery_address: None,
    };

    place(&state, client.user_id, request, ORDER_FORM_PATH).await
}

/// Checkout page
#[utoipa::path(
    get,
    path = "/panier",
    tag = "Orders",
    responses(
        (status = 200, description = "Payment modes for the checkout form"),
        (status = 303, description = "Not signed in or not a client")
    )
)]
pub async fn checkout_page(_client: Authorized<ClientOnly>, flashes: Flashes) -> impl IntoResponse {
    flashes.render(CheckoutView {
        payment_modes: payment_options(),
    })
}

/// Checkout with payment and delivery details
#[utoipa::path(
    post,
    path = "/panier",
    tag = "Orders",
    request_body(content = CheckoutForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Placed: to /mes-commandes; refused: back to /panier with the reason"),
        (status = 422, description = "Missing phone number")
    )
)]
pub async fn checkout(
    State(state): State<AppState>,
    client: Authorized<ClientOnly>,
    ValidatedForm(form): ValidatedForm<CheckoutForm>,
) -> AppResult<FlashRedirect> {
    let payment_mode = match form.mode_paiement.parse::<PaymentMode>() {
        Ok(mode) => mode,
        Err(e) => return flash_failure(e, CHECKOUT_PATH),
    };

    let request = PlaceOrder {
        items: cart_or_empty(form.panier_data.as_deref().unwrap_or_default()),
        payment_mode,
        phone: form.telephone.trim().to_string(),
        delivery_address: non_blank(form.adresse_livraison),
    };

    place(&state, client.user_id, request, CHECKOUT_PATH).await
}

/// The client's orders with their lines, newest first
#[utoipa::path(
    get,
    path = "/mes-commandes",
    tag = "Orders",
    responses(
        (status = 200, description = "Own orders with lines"),
        (status = 303, description = "Not signed in or not a client")
    )
)]
pub async fn my_orders(
    State(state): State<AppState>,
    client: Authorized<ClientOnly>,
    flashes: Flashes,
) -> AppResult<impl IntoResponse> {
    let orders = state.orders().orders_for_user(client.user_id).await?;
    Ok(flashes.render(orders))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_fields_become_cart_items() {
        let soup = Uuid::new_v4();
        let steak = Uuid::new_v4();
        let fields: HashMap<String, String> = [
            (format!("quantite_{}", soup), "2".to_string()),
            (format!("quantite_{}", steak), "".to_string()),
            ("quantite_pas-un-id".to_string(), "3".to_string()),
            ("telephone".to_string(), "0612345678".to_string()),
        ]
        .into_iter()
        .collect();

        let cart = quantity_cart(&fields);

        assert_eq!(cart.len(), 2);
        assert!(cart.contains(&CartItem {
            dish_id: soup,
            quantity: 2
        }));
        assert!(cart.contains(&CartItem {
            dish_id: steak,
            quantity: 0
        }));
    }

    #[test]
    fn test_negative_quantity_counts_as_zero() {
        let dish = Uuid::new_v4();
        let fields: HashMap<String, String> =
            [(format!("quantite_{}", dish), "-4".to_string())].into_iter().collect();

        assert_eq!(quantity_cart(&fields)[0].quantity, 0);
    }

    #[test]
    fn test_unreadable_cart_is_empty() {
        assert!(cart_or_empty("").is_empty());
        assert!(cart_or_empty("{not json").is_empty());

        let dish = Uuid::new_v4();
        let cart = cart_or_empty(&format!(r#"[{{"id": "{}", "quantite": "3"}}]"#, dish));
        assert_eq!(
            cart,
            vec![CartItem {
                dish_id: dish,
                quantity: 3
            }]
        );
    }
}
