//! Reviews page and review posting.

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedForm;
use crate::api::flash::{FlashRedirect, Flashes};
use crate::api::middleware::{Authorized, MaybeActor, Member};
use crate::api::AppState;
use crate::config::{MAX_RATING, MIN_RATING};
use crate::domain::{NewReview, ReviewDetails};
use crate::errors::{AppError, AppResult};
use crate::types::{Paginated, PaginationParams};

const REVIEWS_PATH: &str = "/avis";

/// Review form
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReviewForm {
    /// 1 to 5
    #[schema(example = "5")]
    pub note: String,
    #[validate(length(min = 1, max = 2000, message = "Écrivez un commentaire."))]
    #[schema(example = "Très bon restaurant, je recommande !")]
    pub commentaire: String,
}

#[derive(Debug, Serialize)]
pub struct ReviewsView {
    pub reviews: Paginated<ReviewDetails>,
    pub can_post: bool,
    pub min_rating: i32,
    pub max_rating: i32,
}

pub fn review_routes() -> Router<AppState> {
    Router::new().route(REVIEWS_PATH, get(list_reviews).post(post_review))
}

/// Published reviews, newest first
#[utoipa::path(
    get,
    path = "/avis",
    tag = "Reviews",
    params(PaginationParams),
    responses((status = 200, description = "One page of reviews with their authors"))
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    MaybeActor(actor): MaybeActor,
    Query(params): Query<PaginationParams>,
    flashes: Flashes,
) -> AppResult<impl IntoResponse> {
    let reviews = state.reviews().list(params).await?;

    Ok(flashes.render(ReviewsView {
        reviews,
        can_post: actor.is_some(),
        min_rating: MIN_RATING,
        max_rating: MAX_RATING,
    }))
}

/// Publish a review
#[utoipa::path(
    post,
    path = "/avis",
    tag = "Reviews",
    request_body(content = ReviewForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Published, back to /avis"),
        (status = 422, description = "Rating out of range or comment refused by the filter")
    )
)]
pub async fn post_review(
    State(state): State<AppState>,
    member: Authorized<Member>,
    ValidatedForm(form): ValidatedForm<ReviewForm>,
) -> AppResult<FlashRedirect> {
    let rating = form.note.trim().parse::<i32>().map_err(|_| {
        AppError::field(
            "note",
            format!("La note doit être comprise entre {} et {}.", MIN_RATING, MAX_RATING),
        )
    })?;

    state
        .reviews()
        .post(
            member.user_id,
            NewReview {
                rating,
                comment: form.commentaire,
            },
        )
        .await?;

    Ok(FlashRedirect::success(
        REVIEWS_PATH,
        "Votre avis a été publié avec succès !",
    ))
}
