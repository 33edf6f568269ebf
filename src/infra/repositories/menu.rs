//! Menu catalogue and dining room tables.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

use super::entities::{category, dining_table, dish};
use crate::domain::{Category, CategoryKind, DiningTable, Dish, Money};
use crate::errors::AppResult;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait MenuRepository: Send + Sync {
    async fn list_categories(&self) -> AppResult<Vec<Category>>;

    async fn list_available_dishes(&self) -> AppResult<Vec<Dish>>;

    async fn list_tables(&self) -> AppResult<Vec<DiningTable>>;

    async fn find_table(&self, id: Uuid) -> AppResult<Option<DiningTable>>;
}

/// Dish to add to the catalogue.
#[derive(Debug, Clone)]
pub struct NewDish {
    pub name: String,
    pub description: String,
    pub price: Money,
    pub category_id: Uuid,
}

pub struct MenuQueries<'c, C> {
    conn: &'c C,
}

impl<'c, C: ConnectionTrait> MenuQueries<'c, C> {
    pub fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        let models = category::Entity::find()
            .order_by_asc(category::Column::Name)
            .all(self.conn)
            .await?;

        Ok(models.into_iter().map(Category::from).collect())
    }

    pub async fn list_available_dishes(&self) -> AppResult<Vec<Dish>> {
        let models = dish::Entity::find()
            .filter(dish::Column::Available.eq(true))
            .order_by_asc(dish::Column::Name)
            .all(self.conn)
            .await?;

        Ok(models.into_iter().map(Dish::from).collect())
    }

    /// Dishes with the given ids, available or not.
    pub async fn dishes_by_ids(&self, ids: Vec<Uuid>) -> AppResult<Vec<Dish>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = dish::Entity::find()
            .filter(dish::Column::Id.is_in(ids))
            .all(self.conn)
            .await?;

        Ok(models.into_iter().map(Dish::from).collect())
    }

    pub async fn list_tables(&self) -> AppResult<Vec<DiningTable>> {
        let models = dining_table::Entity::find()
            .order_by_asc(dining_table::Column::Number)
            .all(self.conn)
            .await?;

        Ok(models.into_iter().map(DiningTable::from).collect())
    }

    pub async fn find_table(&self, id: Uuid) -> AppResult<Option<DiningTable>> {
        let model = dining_table::Entity::find_by_id(id).one(self.conn).await?;
        Ok(model.map(DiningTable::from))
    }

    pub async fn count_tables(&self) -> AppResult<u64> {
        Ok(dining_table::Entity::find().count(self.conn).await?)
    }

    pub async fn insert_table(&self, number: i32, seats: i32) -> AppResult<DiningTable> {
        let model = dining_table::ActiveModel {
            id: Set(Uuid::new_v4()),
            number: Set(number),
            seats: Set(seats),
        }
        .insert(self.conn)
        .await?;

        Ok(DiningTable::from(model))
    }

    pub async fn insert_category(&self, name: &str, kind: CategoryKind) -> AppResult<Category> {
        let model = category::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            kind: Set(kind.as_str().to_string()),
        }
        .insert(self.conn)
        .await?;

        Ok(Category::from(model))
    }

    pub async fn insert_dish(&self, new_dish: NewDish) -> AppResult<Dish> {
        let model = dish::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(new_dish.name),
            description: Set(new_dish.description),
            price_cents: Set(new_dish.price.cents()),
            category_id: Set(new_dish.category_id),
            image: Set(None),
            available: Set(true),
        }
        .insert(self.conn)
        .await?;

        Ok(Dish::from(model))
    }

    pub async fn set_dish_available(&self, id: Uuid, available: bool) -> AppResult<()> {
        dish::ActiveModel {
            id: Set(id),
            available: Set(available),
            ..Default::default()
        }
        .update(self.conn)
        .await?;

        Ok(())
    }
}

pub struct MenuStore {
    db: DatabaseConnection,
}

impl MenuStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn queries(&self) -> MenuQueries<'_, DatabaseConnection> {
        MenuQueries::new(&self.db)
    }
}

#[async_trait]
impl MenuRepository for MenuStore {
    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        self.queries().list_categories().await
    }

    async fn list_available_dishes(&self) -> AppResult<Vec<Dish>> {
        self.queries().list_available_dishes().await
    }

    async fn list_tables(&self) -> AppResult<Vec<DiningTable>> {
        self.queries().list_tables().await
    }

    async fn find_table(&self, id: Uuid) -> AppResult<Option<DiningTable>> {
        self.queries().find_table(id).await
    }
}
