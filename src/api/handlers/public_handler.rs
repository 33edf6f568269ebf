//! Public pages: home and menu.

use axum::{extract::State, response::IntoResponse, routing::get, Router};
use serde::Serialize;

use crate::api::flash::Flashes;
use crate::api::middleware::MaybeActor;
use crate::api::AppState;
use crate::domain::{Actor, MenuSection};
use crate::errors::AppResult;

#[derive(Debug, Serialize)]
pub struct HomeView {
    pub restaurant: String,
    pub actor: Option<Actor>,
}

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/menu", get(menu))
}

/// Home page
#[utoipa::path(
    get,
    path = "/",
    tag = "Pages",
    responses((status = 200, description = "Restaurant name and current user"))
)]
pub async fn home(
    State(state): State<AppState>,
    MaybeActor(actor): MaybeActor,
    flashes: Flashes,
) -> impl IntoResponse {
    flashes.render(HomeView {
        restaurant: state.config.restaurant_name.clone(),
        actor,
    })
}

/// Available dishes grouped by course
#[utoipa::path(
    get,
    path = "/menu",
    tag = "Pages",
    responses((status = 200, description = "Menu sections: starters, mains, desserts"))
)]
pub async fn menu(State(state): State<AppState>, flashes: Flashes) -> AppResult<impl IntoResponse> {
    let sections: Vec<MenuSection> = state.menu().menu().await?;
    Ok(flashes.render(sections))
}
