//! Posting and browsing customer reviews.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

use crate::domain::{CommentFilter, NewReview, Rating, Review, ReviewDetails};
use crate::errors::AppResult;
use crate::infra::UnitOfWork;
use crate::types::{Paginated, PaginationParams};

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ReviewService: Send + Sync {
    /// Newest first.
    async fn list(&self, params: PaginationParams) -> AppResult<Paginated<ReviewDetails>>;

    /// Validate the rating and comment, then publish the review.
    async fn post(&self, user_id: Uuid, review: NewReview) -> AppResult<Review>;

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Review>>;
}

pub struct ReviewBoard<U: UnitOfWork> {
    uow: Arc<U>,
    filter: CommentFilter,
}

impl<U: UnitOfWork> ReviewBoard<U> {
    pub fn new(uow: Arc<U>, filter: CommentFilter) -> Self {
        Self { uow, filter }
    }
}

#[async_trait]
impl<U: UnitOfWork> ReviewService for ReviewBoard<U> {
    async fn list(&self, params: PaginationParams) -> AppResult<Paginated<ReviewDetails>> {
        let (reviews, total) = self
            .uow
            .reviews()
            .page(params.offset(), params.limit())
            .await?;

        Ok(Paginated::new(reviews, params.page(), params.limit(), total))
    }

    async fn post(&self, user_id: Uuid, review: NewReview) -> AppResult<Review> {
        let rating = Rating::try_from(review.rating)?;
        self.filter.check(&review.comment)?;

        let review = self
            .uow
            .reviews()
            .insert(user_id, rating, review.comment.trim().to_string())
            .await?;

        tracing::info!(review_id = %review.id, rating = rating.value(), "review posted");
        Ok(review)
    }

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Review>> {
        self.uow.reviews().list_for_user(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::ReviewHeuristics;
    use crate::errors::AppError;
    use crate::services::testing::{SharedTestUnitOfWork, TestUnitOfWork};

    fn board(uow: TestUnitOfWork) -> ReviewBoard<SharedTestUnitOfWork> {
        ReviewBoard::new(
            uow.into_shared(),
            CommentFilter::new(ReviewHeuristics::default()),
        )
    }

    #[tokio::test]
    async fn test_post_stores_trimmed_comment() {
        let user_id = Uuid::new_v4();

        let mut uow = TestUnitOfWork::default();
        uow.reviews
            .expect_insert()
            .withf(|_, rating, comment| {
                rating.value() == 4 && comment == "Très bon accueil, plats généreux."
            })
            .times(1)
            .returning(|user_id, rating, comment| {
                Ok(Review {
                    id: Uuid::new_v4(),
                    user_id,
                    rating,
                    comment,
                    created_at: Utc::now(),
                })
            });

        let review = board(uow)
            .post(
                user_id,
                NewReview {
                    rating: 4,
                    comment: "  Très bon accueil, plats généreux.  ".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(review.user_id, user_id);
    }

    #[tokio::test]
    async fn test_rating_out_of_range_is_refused() {
        let mut uow = TestUnitOfWork::default();
        uow.reviews.expect_insert().never();

        let result = board(uow)
            .post(
                Uuid::new_v4(),
                NewReview {
                    rating: 6,
                    comment: "Très bon accueil, plats généreux.".to_string(),
                },
            )
            .await;

        let Err(AppError::InvalidFields(fields)) = result else {
            panic!("rating 6 was accepted");
        };
        assert!(fields.get("note").is_some());
    }

    #[tokio::test]
    async fn test_gibberish_comment_is_refused() {
        for comment in ["Top", "qsdfghjklm"] {
            let result = board(TestUnitOfWork::default())
                .post(
                    Uuid::new_v4(),
                    NewReview {
                        rating: 5,
                        comment: comment.to_string(),
                    },
                )
                .await;

            let Err(AppError::InvalidFields(fields)) = result else {
                panic!("{:?} was accepted", comment);
            };
            assert!(fields.get("commentaire").is_some());
        }
    }
}
