//! `orders` table.

use sea_orm::entity::prelude::*;

use crate::domain::{Money, Order, OrderStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub payment_mode: String,
    pub total_cents: i64,
    pub delivery_address: Option<String>,
    pub phone: String,
    pub points_earned: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(has_many = "super::order_line::Entity")]
    OrderLine,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::order_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderLine.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Order {
    fn from(model: Model) -> Self {
        Order {
            id: model.id,
            user_id: model.user_id,
            status: model.status.parse().unwrap_or(OrderStatus::Pending),
            payment_mode: model.payment_mode.parse().unwrap_or_default(),
            total: Money::from_cents(model.total_cents),
            delivery_address: model.delivery_address,
            phone: model.phone,
            points_earned: model.points_earned,
            created_at: model.created_at,
        }
    }
}
