//! Service container: every application service behind its trait.

use std::future::Future;
use std::sync::Arc;

use sea_orm::DatabaseConnection;

use super::{
    AccountManager, AccountService, AuthService, Authenticator, MenuCatalog, MenuService,
    OrderDesk, OrderService, ReservationDesk, ReservationService, ReviewBoard, ReviewService,
};
use crate::config::Config;
use crate::domain::CommentFilter;
use crate::errors::AppResult;
use crate::infra::Persistence;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;

    fn accounts(&self) -> Arc<dyn AccountService>;

    fn menu(&self) -> Arc<dyn MenuService>;

    fn reservations(&self) -> Arc<dyn ReservationService>;

    fn orders(&self) -> Arc<dyn OrderService>;

    fn reviews(&self) -> Arc<dyn ReviewService>;
}

#[derive(Clone)]
pub struct Services {
    pub auth: Arc<dyn AuthService>,
    pub accounts: Arc<dyn AccountService>,
    pub menu: Arc<dyn MenuService>,
    pub reservations: Arc<dyn ReservationService>,
    pub orders: Arc<dyn OrderService>,
    pub reviews: Arc<dyn ReviewService>,
}

impl Services {
    /// Wire every service on one Unit of Work over `db`.
    pub fn from_connection(db: DatabaseConnection, config: &Config) -> Self {
        let uow = Arc::new(Persistence::new(db));

        Self {
            auth: Arc::new(Authenticator::new(uow.clone(), config.clone())),
            accounts: Arc::new(AccountManager::new(uow.clone())),
            menu: Arc::new(MenuCatalog::new(uow.clone())),
            reservations: Arc::new(ReservationDesk::new(uow.clone(), config.reservations)),
            orders: Arc::new(OrderDesk::new(uow.clone(), config.loyalty)),
            reviews: Arc::new(ReviewBoard::new(uow, CommentFilter::new(config.reviews))),
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth.clone()
    }

    fn accounts(&self) -> Arc<dyn AccountService> {
        self.accounts.clone()
    }

    fn menu(&self) -> Arc<dyn MenuService> {
        self.menu.clone()
    }

    fn reservations(&self) -> Arc<dyn ReservationService> {
        self.reservations.clone()
    }

    fn orders(&self) -> Arc<dyn OrderService> {
        self.orders.clone()
    }

    fn reviews(&self) -> Arc<dyn ReviewService> {
        self.reviews.clone()
    }
}

/// Run independent service calls concurrently.
pub mod parallel {
    use super::*;
    use tokio::try_join;

    /// Both futures run concurrently; the first error wins.
    pub async fn join2<F1, F2, T1, T2>(f1: F1, f2: F2) -> AppResult<(T1, T2)>
    where
        F1: Future<Output = AppResult<T1>>,
        F2: Future<Output = AppResult<T2>>,
    {
        try_join!(f1, f2)
    }
}
