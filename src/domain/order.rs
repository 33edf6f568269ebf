//! Orders, cart payloads, pricing and loyalty accrual.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::menu::Dish;
use super::money::Money;
use crate::config::{DEFAULT_SPEND_PER_POINT_CENTS, MAX_LINE_QUANTITY};
use crate::errors::{AppError, FieldErrors};

// =============================================================================
// Status machine
// =============================================================================

/// Lifecycle of an order: pending → preparing → ready → delivered, or cancelled
/// from any state that is not final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Preparing,
    Ready,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Orders the kitchen and floor still have to handle.
    pub const TO_SERVE: [OrderStatus; 2] = [OrderStatus::Pending, OrderStatus::Preparing];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "En attente",
            OrderStatus::Preparing => "En préparation",
            OrderStatus::Ready => "Prête",
            OrderStatus::Delivered => "Livrée",
            OrderStatus::Cancelled => "Annulée",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Next step on the happy path.
    pub fn successor(&self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::Preparing),
            OrderStatus::Preparing => Some(OrderStatus::Ready),
            OrderStatus::Ready => Some(OrderStatus::Delivered),
            OrderStatus::Delivered | OrderStatus::Cancelled => None,
        }
    }

    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        next == OrderStatus::Cancelled || self.successor() == Some(next)
    }

    /// Checked transition.
    pub fn transition(self, next: OrderStatus) -> Result<OrderStatus, AppError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(AppError::field(
                "statut",
                format!(
                    "Impossible de passer une commande « {} » à « {} ».",
                    self.label(),
                    next.label()
                ),
            ))
        }
    }
}

impl FromStr for OrderStatus {
    type Err = AppError;

    /// English codes, plus the French codes older clients still post.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pending" | "en_attente" => Ok(OrderStatus::Pending),
            "preparing" | "en_preparation" => Ok(OrderStatus::Preparing),
            "ready" | "prete" => Ok(OrderStatus::Ready),
            "delivered" | "livree" => Ok(OrderStatus::Delivered),
            "cancelled" | "annulee" => Ok(OrderStatus::Cancelled),
            other => Err(AppError::field(
                "statut",
                format!("Statut inconnu : {}", other),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMode {
    #[default]
    Card,
    Cash,
    Paypal,
}

impl PaymentMode {
    pub const ALL: [PaymentMode; 3] = [PaymentMode::Card, PaymentMode::Cash, PaymentMode::Paypal];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMode::Card => "card",
            PaymentMode::Cash => "cash",
            PaymentMode::Paypal => "paypal",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaymentMode::Card => "Carte bancaire",
            PaymentMode::Cash => "Espèces",
            PaymentMode::Paypal => "PayPal",
        }
    }
}

impl FromStr for PaymentMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "card" | "carte" => Ok(PaymentMode::Card),
            "cash" | "especes" | "espèces" => Ok(PaymentMode::Cash),
            "paypal" => Ok(PaymentMode::Paypal),
            other => Err(AppError::field(
                "mode_paiement",
                format!("Mode de paiement inconnu : {}", other),
            )),
        }
    }
}

// =============================================================================
// Orders
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: OrderStatus,
    pub payment_mode: PaymentMode,
    pub total: Money,
    pub delivery_address: Option<String>,
    pub phone: String,
    pub points_earned: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLine {
    pub id: Uuid,
    pub order_id: Uuid,
    pub dish_id: Uuid,
    pub quantity: u32,
    pub unit_price: Money,
}

impl OrderLine {
    pub fn subtotal(&self) -> Money {
        self.unit_price.times(self.quantity)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderLineDetails {
    #[serde(flatten)]
    pub line: OrderLine,
    pub dish_name: String,
    pub subtotal: Money,
}

impl OrderLineDetails {
    pub fn new(line: OrderLine, dish_name: String) -> Self {
        let subtotal = line.subtotal();
        Self {
            line,
            dish_name,
            subtotal,
        }
    }
}

/// Order with its customer and lines, for listings.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetails {
    #[serde(flatten)]
    pub order: Order,
    pub customer: String,
    pub lines: Vec<OrderLineDetails>,
}

/// Checkout request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceOrder {
    pub items: Vec<CartItem>,
    pub payment_mode: PaymentMode,
    pub phone: String,
    pub delivery_address: Option<String>,
}

/// Result of a successful checkout.
#[derive(Debug, Clone, Serialize)]
pub struct PlacedOrder {
    pub order: Order,
    pub lines: Vec<OrderLineDetails>,
    pub points_balance: i64,
}

// =============================================================================
// Cart
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartItem {
    pub dish_id: Uuid,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("panier illisible : {0}")]
    Malformed(String),
}

#[derive(Deserialize)]
struct RawCartItem {
    id: Uuid,
    #[serde(alias = "quantity")]
    quantite: RawQuantity,
}

// Browsers post quantities either as numbers or as the input's string value.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawQuantity {
    Number(u32),
    Text(String),
}

/// Read a cart payload: a JSON array of `{"id": "<uuid>", "quantite": n}`.
/// Unknown fields such as `nom` or `prix` are ignored.
pub fn parse_cart(raw: &str) -> Result<Vec<CartItem>, CartError> {
    let items: Vec<RawCartItem> =
        serde_json::from_str(raw).map_err(|e| CartError::Malformed(e.to_string()))?;

    items
        .into_iter()
        .map(|item| {
            let quantity = match item.quantite {
                RawQuantity::Number(n) => n,
                RawQuantity::Text(text) => text
                    .trim()
                    .parse()
                    .map_err(|_| CartError::Malformed(format!("quantité « {} »", text)))?,
            };
            Ok(CartItem {
                dish_id: item.id,
                quantity,
            })
        })
        .collect()
}

/// Merge repeated dishes and drop zero quantities, keeping first-seen order.
/// A merged quantity above `MAX_LINE_QUANTITY` is refused.
pub fn normalize_cart(items: &[CartItem]) -> Result<Vec<CartItem>, OrderError> {
    let mut merged: Vec<CartItem> = Vec::with_capacity(items.len());
    for item in items.iter().filter(|item| item.quantity > 0) {
        match merged.iter_mut().find(|m| m.dish_id == item.dish_id) {
            Some(existing) => {
                existing.quantity = existing
                    .quantity
                    .checked_add(item.quantity)
                    .ok_or(OrderError::TooMany(MAX_LINE_QUANTITY))?;
            }
            None => merged.push(*item),
        }
    }

    if merged.iter().any(|item| item.quantity > MAX_LINE_QUANTITY) {
        return Err(OrderError::TooMany(MAX_LINE_QUANTITY));
    }
    Ok(merged)
}

// =============================================================================
// Pricing & loyalty
// =============================================================================

/// Points are earned per full `spend_per_point` spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoyaltyPolicy {
    spend_per_point: Money,
}

impl LoyaltyPolicy {
    /// A non-positive spend falls back to the default rate.
    pub fn new(spend_per_point: Money) -> Self {
        if spend_per_point.cents() > 0 {
            Self { spend_per_point }
        } else {
            Self::default()
        }
    }

    pub fn spend_per_point(&self) -> Money {
        self.spend_per_point
    }

    pub fn points_for(&self, total: Money) -> i64 {
        total.cents().max(0) / self.spend_per_point.cents()
    }
}

impl Default for LoyaltyPolicy {
    fn default() -> Self {
        Self {
            spend_per_point: Money::from_cents(DEFAULT_SPEND_PER_POINT_CENTS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    pub dish_id: Uuid,
    pub dish_name: String,
    pub quantity: u32,
    pub unit_price: Money,
}

/// Lines priced from the current menu, with the total and the points it earns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderQuote {
    pub lines: Vec<PricedLine>,
    pub total: Money,
    pub points: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("Votre panier est vide.")]
    EmptyCart,

    #[error("Un plat de votre panier n'existe plus.")]
    UnknownDish(Uuid),

    #[error("Le plat « {0} » n'est plus disponible.")]
    Unavailable(String),

    #[error("{0} portions au maximum par plat.")]
    TooMany(u32),
}

impl From<OrderError> for AppError {
    fn from(error: OrderError) -> Self {
        AppError::InvalidFields(FieldErrors::single("panier", error.to_string()))
    }
}

/// Price a normalized cart against `dishes`. Prices are snapshotted here.
pub fn quote(
    items: &[CartItem],
    dishes: &[Dish],
    loyalty: LoyaltyPolicy,
) -> Result<OrderQuote, OrderError> {
    if items.is_empty() {
        return Err(OrderError::EmptyCart);
    }

    let by_id: HashMap<Uuid, &Dish> = dishes.iter().map(|dish| (dish.id, dish)).collect();

    let lines = items
        .iter()
        .map(|item| {
            let dish = by_id
                .get(&item.dish_id)
                .ok_or(OrderError::UnknownDish(item.dish_id))?;
            if !dish.available {
                return Err(OrderError::Unavailable(dish.name.clone()));
            }
            if item.quantity > MAX_LINE_QUANTITY {
                return Err(OrderError::TooMany(MAX_LINE_QUANTITY));
            }
            Ok(PricedLine {
                dish_id: dish.id,
                dish_name: dish.name.clone(),
                quantity: item.quantity,
                unit_price: dish.price,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let total: Money = lines.iter().map(|l| l.unit_price.times(l.quantity)).sum();

    Ok(OrderQuote {
        points: loyalty.points_for(total),
        lines,
        total,
    })
}
