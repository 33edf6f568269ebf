//! End-to-end service tests against an in-memory SQLite database migrated with
//! the production migrations.

use chrono::{Duration, NaiveTime};
use uuid::Uuid;

use bistrot::commands::seed::{seed_demo, SeedSummary};
use bistrot::config::{Config, MAX_LINE_QUANTITY};
use bistrot::domain::{
    Account, Actor, CartItem, ContactUpdate, Money, NewReservation, NewReview, OrderStatus,
    PaymentMode, PlaceOrder, Registration, Role,
};
use bistrot::errors::AppError;
use bistrot::infra::{Database, Persistence, UnitOfWork};
use bistrot::services::Services;
use bistrot::types::PaginationParams;
use bistrot::with_transaction;

const SECRET: &str = "test-secret-key-for-testing-only-32chars";
const PASSWORD: &str = "Gratin-Dauphinois-7";

struct TestApp {
    services: Services,
    uow: Persistence,
}

async fn setup() -> TestApp {
    let mut config = Config::with_secret("sqlite::memory:", SECRET);
    // One connection, otherwise every pooled connection opens its own empty database.
    config.database_max_connections = 1;

    let db = Database::connect(&config).await.expect("sqlite database");
    seed_demo(&Persistence::new(db.get_connection()))
        .await
        .expect("seed data");

    TestApp {
        services: Services::from_connection(db.get_connection(), &config),
        uow: Persistence::new(db.get_connection()),
    }
}

impl TestApp {
    async fn register(&self, username: &str) -> Account {
        self.services
            .auth
            .register(Registration {
                username: username.to_string(),
                email: format!("{}@example.com", username),
                password: PASSWORD.to_string(),
                password_confirmation: PASSWORD.to_string(),
                role: Role::Client,
            })
            .await
            .expect("registration")
    }

    async fn dish_id(&self, name: &str) -> Uuid {
        self.services
            .menu
            .menu()
            .await
            .unwrap()
            .into_iter()
            .flat_map(|section| section.dishes)
            .find(|entry| entry.dish.name == name)
            .map(|entry| entry.dish.id)
            .unwrap_or_else(|| panic!("{} is not on the menu", name))
    }

    fn order_of(&self, items: Vec<(Uuid, u32)>) -> PlaceOrder {
        PlaceOrder {
            items: items
                .into_iter()
                .map(|(dish_id, quantity)| CartItem { dish_id, quantity })
                .collect(),
            payment_mode: PaymentMode::Cash,
            phone: "0612345678".to_string(),
            delivery_address: None,
        }
    }
}

#[tokio::test]
async fn test_seed_runs_once() {
    let app = setup().await;

    let again = seed_demo(&app.uow).await.unwrap();
    assert_eq!(again, SeedSummary::default());

    let tables = app.services.menu.tables().await.unwrap();
    assert_eq!(tables.len(), 10);
    assert_eq!(tables[0].number, 1);
}

#[tokio::test]
async fn test_registration_opens_client_profile() {
    let app = setup().await;

    let account = app.register("noemie").await;
    assert_eq!(account.profile.role, Role::Client);
    assert_eq!(account.profile.points, 0);

    let session = app
        .services
        .auth
        .login("noemie".to_string(), PASSWORD.to_string())
        .await
        .unwrap();
    assert_eq!(session.actor.user_id, account.user.id);
    assert_eq!(session.landing_path(), "/mon_compte");

    let again = app
        .services
        .auth
        .register(Registration {
            username: "noemie".to_string(),
            email: "autre@example.com".to_string(),
            password: PASSWORD.to_string(),
            password_confirmation: PASSWORD.to_string(),
            role: Role::Client,
        })
        .await;
    let Err(AppError::InvalidFields(fields)) = again else {
        panic!("duplicate username was accepted");
    };
    assert!(fields.get("username").is_some());
}

#[tokio::test]
async fn test_order_snapshots_prices_and_credits_points() {
    let app = setup().await;
    let client = app.register("noemie").await;

    let blanquette = app.dish_id("Blanquette de veau").await;
    let soupe = app.dish_id("Soupe à l'oignon").await;

    // 18.50 + 8.50 = 27.00, five full slices of 5.00
    let placed = app
        .services
        .orders
        .place_order(client.user.id, app.order_of(vec![(blanquette, 1), (soupe, 1)]))
        .await
        .unwrap();

    assert_eq!(placed.order.total, Money::from_cents(2700));
    assert_eq!(placed.order.points_earned, 5);
    assert_eq!(placed.points_balance, 5);
    assert_eq!(placed.order.status, OrderStatus::Pending);
    assert_eq!(placed.lines.len(), 2);

    let second = app
        .services
        .orders
        .place_order(client.user.id, app.order_of(vec![(soupe, 2)]))
        .await
        .unwrap();
    assert_eq!(second.order.points_earned, 3);
    assert_eq!(second.points_balance, 8);

    let history = app.services.orders.orders_for_user(client.user.id).await.unwrap();
    assert_eq!(history.len(), 2);
}

#[tokio::test]
async fn test_unavailable_dish_is_refused() {
    let app = setup().await;
    let client = app.register("noemie").await;
    let tatin = app.dish_id("Tarte Tatin").await;

    with_transaction!(app.uow, |ctx| {
        ctx.menu().set_dish_available(tatin, false).await
    })
    .unwrap();

    let result = app
        .services
        .orders
        .place_order(client.user.id, app.order_of(vec![(tatin, 1)]))
        .await;

    let Err(AppError::InvalidFields(fields)) = result else {
        panic!("unavailable dish was ordered");
    };
    assert!(fields.get("panier").is_some());

    let dashboard = app.services.accounts.client_dashboard(client.user.id).await.unwrap();
    assert!(dashboard.orders.is_empty());
    assert_eq!(dashboard.account.profile.points, 0);
}

#[tokio::test]
async fn test_oversized_quantity_is_refused_without_points() {
    let app = setup().await;
    let client = app.register("noemie").await;
    let soupe = app.dish_id("Soupe à l'oignon").await;

    for items in [
        vec![(soupe, MAX_LINE_QUANTITY + 1)],
        vec![(soupe, 3_000_000_000)],
        vec![(soupe, 3_000_000_000), (soupe, 3_000_000_000)],
    ] {
        let result = app
            .services
            .orders
            .place_order(client.user.id, app.order_of(items))
            .await;

        let Err(AppError::InvalidFields(fields)) = result else {
            panic!("oversized order was accepted");
        };
        assert!(fields.get("panier").is_some());
    }

    let dashboard = app.services.accounts.client_dashboard(client.user.id).await.unwrap();
    assert!(dashboard.orders.is_empty());
    assert_eq!(dashboard.account.profile.points, 0);

    let placed = app
        .services
        .orders
        .place_order(client.user.id, app.order_of(vec![(soupe, MAX_LINE_QUANTITY)]))
        .await
        .unwrap();
    assert_eq!(placed.lines[0].line.quantity, MAX_LINE_QUANTITY);
}

#[tokio::test]
async fn test_one_booking_per_table_and_slot() {
    let app = setup().await;
    let first = app.register("noemie").await;
    let second = app.register("bastien").await;

    let table = app.services.menu.tables().await.unwrap()[0].clone();
    let request = NewReservation {
        table_id: table.id,
        date: chrono::Local::now().date_naive() + Duration::days(3),
        time: NaiveTime::from_hms_opt(20, 0, 0).unwrap(),
    };

    let booked = app
        .services
        .reservations
        .book(first.user.id, request)
        .await
        .unwrap();
    assert_eq!(booked.table_number, table.number);

    let Err(AppError::InvalidFields(fields)) =
        app.services.reservations.book(second.user.id, request).await
    else {
        panic!("slot was booked twice");
    };
    assert!(fields.get("table").is_some());

    // Only the owner can cancel.
    let stranger = app
        .services
        .reservations
        .cancel(second.user.id, booked.reservation.id)
        .await;
    assert!(matches!(stranger, Err(AppError::NotFound(_))));

    app.services
        .reservations
        .cancel(first.user.id, booked.reservation.id)
        .await
        .unwrap();
    app.services
        .reservations
        .book(second.user.id, request)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_contact_update_writes_user_and_profile() {
    let app = setup().await;
    let client = app.register("noemie").await;

    app.services
        .accounts
        .update_contact(
            client.user.id,
            ContactUpdate {
                first_name: "Noémie".to_string(),
                last_name: "Laurent".to_string(),
                email: "noemie.laurent@example.com".to_string(),
                phone: Some("0612345678".to_string()),
            },
        )
        .await
        .unwrap();

    let account = app.services.accounts.client_dashboard(client.user.id).await.unwrap().account;
    assert_eq!(account.user.last_name, "Laurent");
    assert_eq!(account.user.email, "noemie.laurent@example.com");
    assert_eq!(account.profile.phone.as_deref(), Some("0612345678"));

    let missing = app
        .services
        .accounts
        .update_contact(Uuid::new_v4(), ContactUpdate::default())
        .await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_promotion_opens_employee_record() {
    let app = setup().await;
    let account = app.register("camille").await;

    let promoted = app
        .services
        .accounts
        .change_role("camille".to_string(), Role::Employee)
        .await
        .unwrap();
    assert_eq!(promoted.profile.role, Role::Employee);

    let record = app
        .services
        .accounts
        .employee_record(account.user.id)
        .await
        .unwrap();
    assert_eq!(record.schedule.len(), 7);
    assert_eq!(record.seniority_days, 0);

    app.services
        .accounts
        .change_role("camille".to_string(), Role::Client)
        .await
        .unwrap();
    let info = app
        .uow
        .accounts()
        .find_employee_info(account.profile.id)
        .await
        .unwrap();
    assert!(info.is_none());

    let actor = app.services.accounts.actor(account.user.id).await.unwrap();
    assert_eq!(actor.map(|a| a.role), Some(Role::Client));
}

#[tokio::test]
async fn test_kitchen_moves_orders_along() {
    let app = setup().await;
    let client = app.register("noemie").await;
    app.register("camille").await;
    let employee = app
        .services
        .accounts
        .change_role("camille".to_string(), Role::Employee)
        .await
        .unwrap();

    let soupe = app.dish_id("Soupe à l'oignon").await;
    let placed = app
        .services
        .orders
        .place_order(client.user.id, app.order_of(vec![(soupe, 1)]))
        .await
        .unwrap();

    let client_actor = Actor {
        user_id: client.user.id,
        username: client.user.username.clone(),
        role: Role::Client,
    };
    let refused = app
        .services
        .orders
        .change_status(client_actor, placed.order.id, OrderStatus::Preparing)
        .await;
    assert!(matches!(refused, Err(AppError::Forbidden)));

    let preparing = app
        .services
        .orders
        .change_status(employee.actor(), placed.order.id, OrderStatus::Preparing)
        .await
        .unwrap();
    assert_eq!(preparing.status, OrderStatus::Preparing);

    let to_serve = app.services.orders.orders_to_serve().await.unwrap();
    assert_eq!(to_serve.len(), 1);
    assert_eq!(to_serve[0].customer, "noemie");

    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    let later = app
        .services
        .orders
        .place_order(client.user.id, app.order_of(vec![(soupe, 2)]))
        .await
        .unwrap();

    let to_serve = app.services.orders.orders_to_serve().await.unwrap();
    let ids: Vec<Uuid> = to_serve.iter().map(|details| details.order.id).collect();
    assert_eq!(ids, vec![later.order.id, placed.order.id]);

    app.services
        .orders
        .change_status(employee.actor(), placed.order.id, OrderStatus::Ready)
        .await
        .unwrap();
    let to_serve = app.services.orders.orders_to_serve().await.unwrap();
    assert_eq!(to_serve.len(), 1);
    assert_eq!(to_serve[0].order.id, later.order.id);
}

#[tokio::test]
async fn test_reviews_are_filtered_and_listed() {
    let app = setup().await;
    let client = app.register("noemie").await;

    let refused = app
        .services
        .reviews
        .post(
            client.user.id,
            NewReview {
                rating: 5,
                comment: "azertyuiop".to_string(),
            },
        )
        .await;
    assert!(matches!(refused, Err(AppError::InvalidFields(_))));

    app.services
        .reviews
        .post(
            client.user.id,
            NewReview {
                rating: 5,
                comment: "Très bon restaurant, je recommande !".to_string(),
            },
        )
        .await
        .unwrap();

    let page = app
        .services
        .reviews
        .list(PaginationParams::default())
        .await
        .unwrap();
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].author, "noemie");
    assert_eq!(page.data[0].review.rating.value(), 5);
}
