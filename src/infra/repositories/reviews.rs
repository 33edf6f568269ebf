//! Customer reviews.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

use super::entities::{review, user};
use crate::domain::{Rating, Review, ReviewDetails};
use crate::errors::AppResult;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn insert(&self, user_id: Uuid, rating: Rating, comment: String) -> AppResult<Review>;

    /// One page of reviews, newest first, with the total count.
    async fn page(&self, offset: u64, limit: u64) -> AppResult<(Vec<ReviewDetails>, u64)>;

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Review>>;
}

pub struct ReviewQueries<'c, C> {
    conn: &'c C,
}

impl<'c, C: ConnectionTrait> ReviewQueries<'c, C> {
    pub fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    pub async fn insert(&self, user_id: Uuid, rating: Rating, comment: String) -> AppResult<Review> {
        let model = review::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            rating: Set(rating.value()),
            comment: Set(comment),
            created_at: Set(Utc::now()),
        }
        .insert(self.conn)
        .await?;

        Ok(Review::from(model))
    }

    pub async fn page(&self, offset: u64, limit: u64) -> AppResult<(Vec<ReviewDetails>, u64)> {
        let total = review::Entity::find().count(self.conn).await?;

        let rows = review::Entity::find()
            .find_also_related(user::Entity)
            .order_by_desc(review::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.conn)
            .await?;

        let reviews = rows
            .into_iter()
            .map(|(review, author)| ReviewDetails {
                author: author.map(|u| u.username).unwrap_or_default(),
                review: Review::from(review),
            })
            .collect();

        Ok((reviews, total))
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Review>> {
        let models = review::Entity::find()
            .filter(review::Column::UserId.eq(user_id))
            .order_by_desc(review::Column::CreatedAt)
            .all(self.conn)
            .await?;

        Ok(models.into_iter().map(Review::from).collect())
    }
}

pub struct ReviewStore {
    db: DatabaseConnection,
}

impl ReviewStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn queries(&self) -> ReviewQueries<'_, DatabaseConnection> {
        ReviewQueries::new(&self.db)
    }
}

#[async_trait]
impl ReviewRepository for ReviewStore {
    async fn insert(&self, user_id: Uuid, rating: Rating, comment: String) -> AppResult<Review> {
        self.queries().insert(user_id, rating, comment).await
    }

    async fn page(&self, offset: u64, limit: u64) -> AppResult<(Vec<ReviewDetails>, u64)> {
        self.queries().page(offset, limit).await
    }

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Review>> {
        self.queries().list_for_user(user_id).await
    }
}
