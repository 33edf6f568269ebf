//! Unit of Work over mock repositories for service tests.
//!
//! Repositories without expectations panic when called, so a test only sets up
//! the ones its service is supposed to touch.

use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::{AppError, AppResult};
use crate::infra::{
    AccountRepository, MenuRepository, MockAccountRepository, MockMenuRepository,
    MockOrderRepository, MockReservationRepository, MockReviewRepository, OrderRepository,
    ReservationRepository, ReviewRepository, TransactionContext, TxFuture, UnitOfWork,
};

#[derive(Default)]
pub struct TestUnitOfWork {
    pub accounts: MockAccountRepository,
    pub menu: MockMenuRepository,
    pub reservations: MockReservationRepository,
    pub orders: MockOrderRepository,
    pub reviews: MockReviewRepository,
}

impl TestUnitOfWork {
    pub fn into_shared(self) -> Arc<SharedTestUnitOfWork> {
        Arc::new(SharedTestUnitOfWork {
            accounts: Arc::new(self.accounts),
            menu: Arc::new(self.menu),
            reservations: Arc::new(self.reservations),
            orders: Arc::new(self.orders),
            reviews: Arc::new(self.reviews),
        })
    }
}

pub struct SharedTestUnitOfWork {
    accounts: Arc<MockAccountRepository>,
    menu: Arc<MockMenuRepository>,
    reservations: Arc<MockReservationRepository>,
    orders: Arc<MockOrderRepository>,
    reviews: Arc<MockReviewRepository>,
}

#[async_trait]
impl UnitOfWork for SharedTestUnitOfWork {
    fn accounts(&self) -> Arc<dyn AccountRepository> {
        self.accounts.clone()
    }

    fn menu(&self) -> Arc<dyn MenuRepository> {
        self.menu.clone()
    }

    fn reservations(&self) -> Arc<dyn ReservationRepository> {
        self.reservations.clone()
    }

    fn orders(&self) -> Arc<dyn OrderRepository> {
        self.orders.clone()
    }

    fn reviews(&self) -> Arc<dyn ReviewRepository> {
        self.reviews.clone()
    }

    async fn transaction<F, T>(&self, _f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        Err(AppError::internal("Transactions not supported in test mock"))
    }
}
