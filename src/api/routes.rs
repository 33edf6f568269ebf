//! Application route configuration.

use axum::{extract::State, http::StatusCode, middleware, response::Json, routing::get, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{
    account_routes, auth_routes, employee_routes, order_routes, public_routes,
    reservation_routes, review_routes,
};
use super::middleware::session_middleware;
use super::openapi::ApiDoc;
use super::AppState;

/// Create the application router with all routes configured
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        // OpenAPI Swagger UI documentation
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public_routes())
        .merge(auth_routes())
        .merge(account_routes())
        .merge(reservation_routes())
        .merge(order_routes())
        .merge(review_routes())
        .merge(employee_routes())
        // Global middleware: every route sees the session actor, guards live on the handlers
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    database: ServiceStatus,
}

/// Service status
#[derive(Serialize)]
struct ServiceStatus {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Health check endpoint with database connectivity check
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match state.database.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy",
                database: ServiceStatus {
                    status: "healthy",
                    error: None,
                },
            }),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unhealthy",
                    database: ServiceStatus {
                        status: "unhealthy",
                        error: Some(e.to_string()),
                    },
                }),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{
        header::{CACHE_CONTROL, CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
        Request,
    };
    use chrono::Utc;
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::config::{Config, FLASH_COOKIE, SESSION_COOKIE};
    use crate::domain::{Actor, Money, Order, OrderStatus, PaymentMode, Role};
    use crate::errors::AppError;
    use crate::infra::Database;
    use crate::services::{
        AccountService, AuthService, MenuService, MockAccountService, MockAuthService,
        MockMenuService, MockOrderService, MockReservationService, MockReviewService,
        MockServiceContainer, OrderService, ReservationService, ReviewService, SessionClaims,
    };

    const TOKEN: &str = "session-token";

    #[derive(Default)]
    struct Mocks {
        auth: MockAuthService,
        accounts: MockAccountService,
        orders: MockOrderService,
    }

    impl Mocks {
        /// Every request carrying `TOKEN` is `actor`.
        fn signed_in(actor: Actor) -> Self {
            let mut mocks = Mocks::default();
            let user_id = actor.user_id;
            let username = actor.username.clone();
            let role = actor.role.to_string();

            mocks.auth.expect_verify_session().returning(move |token| {
                if token != TOKEN {
                    return Err(AppError::Unauthorized);
                }
                Ok(SessionClaims {
                    sub: user_id,
                    username: username.clone(),
                    role: role.clone(),
                    exp: Utc::now().timestamp() + 3600,
                    iat: Utc::now().timestamp(),
                })
            });
            mocks
                .accounts
                .expect_actor()
                .returning(move |_| Ok(Some(actor.clone())));
            mocks
        }

        async fn into_router(self) -> Router {
            let auth: Arc<dyn AuthService> = Arc::new(self.auth);
            let accounts: Arc<dyn AccountService> = Arc::new(self.accounts);
            let orders: Arc<dyn OrderService> = Arc::new(self.orders);
            let menu: Arc<dyn MenuService> = Arc::new(MockMenuService::new());
            let reservations: Arc<dyn ReservationService> = Arc::new(MockReservationService::new());
            let reviews: Arc<dyn ReviewService> = Arc::new(MockReviewService::new());

            let mut services = MockServiceContainer::new();
            services.expect_auth().returning(move || auth.clone());
            services.expect_accounts().returning(move || accounts.clone());
            services.expect_orders().returning(move || orders.clone());
            services.expect_menu().returning(move || menu.clone());
            services
                .expect_reservations()
                .returning(move || reservations.clone());
            services.expect_reviews().returning(move || reviews.clone());

            let connection = sea_orm::Database::connect("sqlite::memory:").await.unwrap();
            let state = AppState::new(
                Arc::new(services),
                Arc::new(Database::from_connection(connection)),
                Config::with_secret("sqlite::memory:", "test-secret-key-for-testing-only-32chars"),
            );
            create_router(state)
        }
    }

    fn actor(role: Role) -> Actor {
        Actor {
            user_id: Uuid::new_v4(),
            username: "sacha".to_string(),
            role,
        }
    }

    fn status_change(order_id: Uuid, status: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/changer_statut_commande/{}", order_id))
            .header(COOKIE, format!("{}={}", SESSION_COOKIE, TOKEN))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!("statut={}", status)))
            .unwrap()
    }

    fn flash_of(response: &axum::response::Response) -> Option<String> {
        response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find(|value| value.starts_with(FLASH_COOKIE))
            .map(str::to_string)
    }

    #[tokio::test]
    async fn test_health_reports_database() {
        let app = Mocks::default().into_router().await;

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_anonymous_account_page_redirects_to_login() {
        let app = Mocks::default().into_router().await;

        let response = app
            .oneshot(Request::builder().uri("/mon_compte").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/login");
        assert!(flash_of(&response).is_some());
    }

    #[tokio::test]
    async fn test_client_cannot_change_order_status() {
        let mut mocks = Mocks::signed_in(actor(Role::Client));
        mocks.orders.expect_change_status().never();
        let app = mocks.into_router().await;

        let response = app
            .oneshot(status_change(Uuid::new_v4(), "preparing"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/mon_compte");
        assert_eq!(
            response.headers()[CACHE_CONTROL],
            "no-store, no-cache, must-revalidate, max-age=0"
        );
    }

    #[tokio::test]
    async fn test_employee_changes_order_status() {
        let order_id = Uuid::new_v4();
        let mut mocks = Mocks::signed_in(actor(Role::Employee));
        mocks
            .orders
            .expect_change_status()
            .withf(move |actor, id, status| {
                actor.is_employee() && *id == order_id && *status == OrderStatus::Preparing
            })
            .times(1)
            .returning(|_, id, status| {
                Ok(Order {
                    id,
                    user_id: Uuid::new_v4(),
                    status,
                    payment_mode: PaymentMode::Card,
                    total: Money::from_cents(2700),
                    delivery_address: None,
                    phone: String::new(),
                    points_earned: 5,
                    created_at: Utc::now(),
                })
            });
        let app = mocks.into_router().await;

        let response = app.oneshot(status_change(order_id, "preparing")).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/mon_compte_employe");
        assert!(flash_of(&response).unwrap().contains("success"));
    }

    #[tokio::test]
    async fn test_unknown_status_is_flashed_back() {
        let mut mocks = Mocks::signed_in(actor(Role::Employee));
        mocks.orders.expect_change_status().never();
        let app = mocks.into_router().await;

        let response = app
            .oneshot(status_change(Uuid::new_v4(), "flambee"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/mon_compte_employe");
        assert!(flash_of(&response).unwrap().contains("error"));
    }

    #[tokio::test]
    async fn test_forged_token_is_anonymous() {
        let app = Mocks::signed_in(actor(Role::Client)).into_router().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/mon_compte")
                    .header(COOKIE, format!("{}=forged", SESSION_COOKIE))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()[LOCATION], "/login");
        assert!(response.headers().get(CACHE_CONTROL).is_none());
    }
}
