//! `dishes` table.

use sea_orm::entity::prelude::*;

use crate::domain::{Dish, Money};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "dishes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub category_id: Uuid,
    pub image: Option<String>,
    pub available: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_delete = "Cascade"
    )]
    Category,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Dish {
    fn from(model: Model) -> Self {
        Dish {
            id: model.id,
            name: model.name,
            description: model.description,
            price: Money::from_cents(model.price_cents),
            category_id: model.category_id,
            image: model.image,
            available: model.available,
        }
    }
}
