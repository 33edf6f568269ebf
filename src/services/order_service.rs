//! Placing orders, listing them and moving them through the kitchen.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

use crate::domain::{
    normalize_cart, quote, Actor, LoyaltyPolicy, Order, OrderDetails, OrderError, OrderLine,
    OrderLineDetails, OrderStatus, PlaceOrder, PlacedOrder,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::with_transaction;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait OrderService: Send + Sync {
    /// Price the cart, store the order and credit loyalty points, atomically.
    async fn place_order(&self, user_id: Uuid, request: PlaceOrder) -> AppResult<PlacedOrder>;

    async fn orders_for_user(&self, user_id: Uuid) -> AppResult<Vec<OrderDetails>>;

    /// Orders still waiting to be served, newest first.
    async fn orders_to_serve(&self) -> AppResult<Vec<OrderDetails>>;

    /// Move an order to `status`. Only employees may do this.
    async fn change_status(
        &self,
        actor: Actor,
        order_id: Uuid,
        status: OrderStatus,
    ) -> AppResult<Order>;
}

pub struct OrderDesk<U: UnitOfWork> {
    uow: Arc<U>,
    loyalty: LoyaltyPolicy,
}

impl<U: UnitOfWork> OrderDesk<U> {
    pub fn new(uow: Arc<U>, loyalty: LoyaltyPolicy) -> Self {
        Self { uow, loyalty }
    }
}

#[async_trait]
impl<U: UnitOfWork> OrderService for OrderDesk<U> {
    async fn place_order(&self, user_id: Uuid, request: PlaceOrder) -> AppResult<PlacedOrder> {
        let items = normalize_cart(&request.items)?;
        if items.is_empty() {
            return Err(OrderError::EmptyCart.into());
        }

        let loyalty = self.loyalty;
        let placed = with_transaction!(self.uow, |ctx| {
            let dish_ids = items.iter().map(|item| item.dish_id).collect();
            let dishes = ctx.menu().dishes_by_ids(dish_ids).await?;
            let priced = quote(&items, &dishes, loyalty)?;

            let order = Order {
                id: Uuid::new_v4(),
                user_id,
                status: OrderStatus::Pending,
                payment_mode: request.payment_mode,
                total: priced.total,
                delivery_address: request.delivery_address,
                phone: request.phone,
                points_earned: priced.points,
                created_at: Utc::now(),
            };
            let lines: Vec<OrderLine> = priced
                .lines
                .iter()
                .map(|line| OrderLine {
                    id: Uuid::new_v4(),
                    order_id: order.id,
                    dish_id: line.dish_id,
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                })
                .collect();

            ctx.orders().insert(&order, &lines).await?;
            let points_balance = ctx.accounts().add_points(user_id, priced.points).await?;

            let lines = lines
                .into_iter()
                .zip(priced.lines)
                .map(|(line, priced)| OrderLineDetails::new(line, priced.dish_name))
                .collect();

            Ok(PlacedOrder {
                order,
                lines,
                points_balance,
            })
        })?;

        tracing::info!(
            order_id = %placed.order.id,
            total = %placed.order.total,
            points = placed.order.points_earned,
            "order placed"
        );
        Ok(placed)
    }

    async fn orders_for_user(&self, user_id: Uuid) -> AppResult<Vec<OrderDetails>> {
        self.uow.orders().list_for_user(user_id).await
    }

    async fn orders_to_serve(&self) -> AppResult<Vec<OrderDetails>> {
        self.uow
            .orders()
            .list_by_status(OrderStatus::TO_SERVE.to_vec())
            .await
    }

    async fn change_status(
        &self,
        actor: Actor,
        order_id: Uuid,
        status: OrderStatus,
    ) -> AppResult<Order> {
        if !actor.is_employee() {
            tracing::warn!(username = %actor.username, %order_id, "status change refused");
            return Err(AppError::Forbidden);
        }

        let orders = self.uow.orders();
        let mut order = orders.find(order_id).await?.ok_or_not_found("Commande")?;
        let next = order.status.transition(status)?;

        if !orders.update_status(order_id, order.status, next).await? {
            return Err(AppError::conflict(
                "La commande a été modifiée entre-temps, veuillez réessayer.",
            ));
        }

        tracing::info!(
            %order_id,
            from = order.status.as_str(),
            to = next.as_str(),
            by = %actor.username,
            "order status changed"
        );
        order.status = next;
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;

    use super::*;
    use crate::domain::{CartItem, Money, PaymentMode, Role};
    use crate::services::testing::TestUnitOfWork;

    fn actor(role: Role) -> Actor {
        Actor {
            user_id: Uuid::new_v4(),
            username: "camille".to_string(),
            role,
        }
    }

    fn order(id: Uuid, status: OrderStatus) -> Order {
        Order {
            id,
            user_id: Uuid::new_v4(),
            status,
            payment_mode: PaymentMode::Cash,
            total: Money::from_cents(2700),
            delivery_address: None,
            phone: "0612345678".to_string(),
            points_earned: 5,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_clients_cannot_change_status() {
        let mut uow = TestUnitOfWork::default();
        uow.orders.expect_find().never();
        uow.orders.expect_update_status().never();

        let desk = OrderDesk::new(uow.into_shared(), LoyaltyPolicy::default());
        let result = desk
            .change_status(actor(Role::Client), Uuid::new_v4(), OrderStatus::Preparing)
            .await;

        assert!(matches!(result, Err(AppError::Forbidden)));
    }

    #[tokio::test]
    async fn test_employee_moves_order_forward() {
        let order_id = Uuid::new_v4();

        let mut uow = TestUnitOfWork::default();
        uow.orders
            .expect_find()
            .with(eq(order_id))
            .returning(|id| Ok(Some(order(id, OrderStatus::Pending))));
        uow.orders
            .expect_update_status()
            .with(eq(order_id), eq(OrderStatus::Pending), eq(OrderStatus::Preparing))
            .times(1)
            .returning(|_, _, _| Ok(true));

        let desk = OrderDesk::new(uow.into_shared(), LoyaltyPolicy::default());
        let updated = desk
            .change_status(actor(Role::Employee), order_id, OrderStatus::Preparing)
            .await
            .unwrap();

        assert_eq!(updated.status, OrderStatus::Preparing);
    }

    #[tokio::test]
    async fn test_delivered_order_cannot_go_back() {
        let mut uow = TestUnitOfWork::default();
        uow.orders
            .expect_find()
            .returning(|id| Ok(Some(order(id, OrderStatus::Delivered))));
        uow.orders.expect_update_status().never();

        let desk = OrderDesk::new(uow.into_shared(), LoyaltyPolicy::default());
        let result = desk
            .change_status(actor(Role::Employee), Uuid::new_v4(), OrderStatus::Pending)
            .await;

        let Err(AppError::InvalidFields(fields)) = result else {
            panic!("backward transition was accepted");
        };
        assert!(fields.get("statut").is_some());
    }

    #[tokio::test]
    async fn test_concurrent_update_is_a_conflict() {
        let mut uow = TestUnitOfWork::default();
        uow.orders
            .expect_find()
            .returning(|id| Ok(Some(order(id, OrderStatus::Preparing))));
        uow.orders
            .expect_update_status()
            .returning(|_, _, _| Ok(false));

        let desk = OrderDesk::new(uow.into_shared(), LoyaltyPolicy::default());
        let result = desk
            .change_status(actor(Role::Employee), Uuid::new_v4(), OrderStatus::Ready)
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_cart_of_zero_quantities_is_empty() {
        let desk = OrderDesk::new(TestUnitOfWork::default().into_shared(), LoyaltyPolicy::default());

        let result = desk
            .place_order(
                Uuid::new_v4(),
                PlaceOrder {
                    items: vec![CartItem {
                        dish_id: Uuid::new_v4(),
                        quantity: 0,
                    }],
                    payment_mode: PaymentMode::Card,
                    phone: String::new(),
                    delivery_address: None,
                },
            )
            .await;

        let Err(AppError::InvalidFields(fields)) = result else {
            panic!("empty cart was accepted");
        };
        assert_eq!(
            fields.get("panier"),
            Some(&[OrderError::EmptyCart.to_string()][..])
        );
    }
}
