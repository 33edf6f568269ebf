//! Orders and their lines.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

use super::entities::{dish, order, order_line, user};
use crate::config::MAX_LINE_QUANTITY;
use crate::domain::{Order, OrderDetails, OrderError, OrderLine, OrderLineDetails, OrderStatus};
use crate::errors::{AppError, AppResult};

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn find(&self, id: Uuid) -> AppResult<Option<Order>>;

    /// Move an order from `from` to `to`. Returns `false` when the order is no
    /// longer in `from`.
    async fn update_status(&self, id: Uuid, from: OrderStatus, to: OrderStatus)
        -> AppResult<bool>;

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<OrderDetails>>;

    async fn list_by_status(&self, statuses: Vec<OrderStatus>) -> AppResult<Vec<OrderDetails>>;
}

pub struct OrderQueries<'c, C> {
    conn: &'c C,
}

impl<'c, C: ConnectionTrait> OrderQueries<'c, C> {
    pub fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    pub async fn insert(&self, order: &Order, lines: &[OrderLine]) -> AppResult<()> {
        order::ActiveModel {
            id: Set(order.id),
            user_id: Set(order.user_id),
            status: Set(order.status.as_str().to_string()),
            payment_mode: Set(order.payment_mode.as_str().to_string()),
            total_cents: Set(order.total.cents()),
            delivery_address: Set(order.delivery_address.clone()),
            phone: Set(order.phone.clone()),
            points_earned: Set(order.points_earned),
            created_at: Set(order.created_at),
        }
        .insert(self.conn)
        .await?;

        for line in lines {
            let quantity = i32::try_from(line.quantity)
                .map_err(|_| AppError::from(OrderError::TooMany(MAX_LINE_QUANTITY)))?;
            order_line::ActiveModel {
                id: Set(line.id),
                order_id: Set(line.order_id),
                dish_id: Set(line.dish_id),
                quantity: Set(quantity),
                unit_price_cents: Set(line.unit_price.cents()),
            }
            .insert(self.conn)
            .await?;
        }

        Ok(())
    }

    pub async fn find(&self, id: Uuid) -> AppResult<Option<Order>> {
        let model = order::Entity::find_by_id(id).one(self.conn).await?;
        Ok(model.map(Order::from))
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    ) -> AppResult<bool> {
        let result = order::Entity::update_many()
            .col_expr(order::Column::Status, Expr::value(to.as_str()))
            .filter(order::Column::Id.eq(id))
            .filter(order::Column::Status.eq(from.as_str()))
            .exec(self.conn)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Newest first.
    pub async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<OrderDetails>> {
        let rows = order::Entity::find()
            .filter(order::Column::UserId.eq(user_id))
            .find_also_related(user::Entity)
            .order_by_desc(order::Column::CreatedAt)
            .all(self.conn)
            .await?;

        self.with_lines(rows).await
    }

    /// Newest first.
    pub async fn list_by_status(&self, statuses: Vec<OrderStatus>) -> AppResult<Vec<OrderDetails>> {
        let codes: Vec<&'static str> = statuses.iter().map(OrderStatus::as_str).collect();

        let rows = order::Entity::find()
            .filter(order::Column::Status.is_in(codes))
            .find_also_related(user::Entity)
            .order_by_desc(order::Column::CreatedAt)
            .all(self.conn)
            .await?;

        self.with_lines(rows).await
    }

    async fn with_lines(
        &self,
        rows: Vec<(order::Model, Option<user::Model>)>,
    ) -> AppResult<Vec<OrderDetails>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = rows.iter().map(|(order, _)| order.id).collect();
        let line_rows = order_line::Entity::find()
            .filter(order_line::Column::OrderId.is_in(ids))
            .find_also_related(dish::Entity)
            .all(self.conn)
            .await?;

        let mut lines: HashMap<Uuid, Vec<OrderLineDetails>> = HashMap::new();
        for (line, dish) in line_rows {
            let dish_name = dish.map(|d| d.name).unwrap_or_default();
            let line = OrderLine::from(line);
            lines
                .entry(line.order_id)
                .or_default()
                .push(OrderLineDetails::new(line, dish_name));
        }

        Ok(rows
            .into_iter()
            .map(|(order, customer)| {
                let mut order_lines = lines.remove(&order.id).unwrap_or_default();
                order_lines.sort_by(|a, b| a.dish_name.cmp(&b.dish_name));
                OrderDetails {
                    customer: customer.map(|u| u.username).unwrap_or_default(),
                    order: Order::from(order),
                    lines: order_lines,
                }
            })
            .collect())
    }
}

pub struct OrderStore {
    db: DatabaseConnection,
}

impl OrderStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn queries(&self) -> OrderQueries<'_, DatabaseConnection> {
        OrderQueries::new(&self.db)
    }
}

#[async_trait]
impl OrderRepository for OrderStore {
    async fn find(&self, id: Uuid) -> AppResult<Option<Order>> {
        self.queries().find(id).await
    }

    async fn update_status(
        &self,
        id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    ) -> AppResult<bool> {
        self.queries().update_status(id, from, to).await
    }

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<OrderDetails>> {
        self.queries().list_for_user(user_id).await
    }

    async fn list_by_status(&self, statuses: Vec<OrderStatus>) -> AppResult<Vec<OrderDetails>> {
        self.queries().list_by_status(statuses).await
    }
}
