//! Unit of Work: one entry point to every repository, plus transactions.
//!
//! Pooled reads go through the `Arc<dyn ...Repository>` getters. Work that must
//! be atomic (placing an order, registering a user, changing a role) runs in
//! `transaction`, whose context hands out the same queries bound to the open
//! transaction.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};

use super::repositories::{
    AccountQueries, AccountRepository, AccountStore, MenuQueries, MenuRepository, MenuStore,
    OrderQueries, OrderRepository, OrderStore, ReservationQueries, ReservationRepository,
    ReservationStore, ReviewQueries, ReviewRepository, ReviewStore,
};
use crate::errors::{AppError, AppResult};

/// Boxed future returned by transaction closures.
pub type TxFuture<'a, T> = Pin<Box<dyn Future<Output = AppResult<T>> + Send + 'a>>;

/// Unit of Work trait for dependency injection.
///
/// Not mockable directly because `transaction` is generic; tests provide a
/// small implementation over mock repositories instead.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    fn accounts(&self) -> Arc<dyn AccountRepository>;

    fn menu(&self) -> Arc<dyn MenuRepository>;

    fn reservations(&self) -> Arc<dyn ReservationRepository>;

    fn orders(&self) -> Arc<dyn OrderRepository>;

    fn reviews(&self) -> Arc<dyn ReviewRepository>;

    /// Run `f` in a transaction, committed on `Ok` and rolled back on `Err`.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send;
}

/// Repository access bound to one open transaction.
pub struct TransactionContext<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TransactionContext<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    pub fn accounts(&self) -> AccountQueries<'a, DatabaseTransaction> {
        AccountQueries::new(self.txn)
    }

    pub fn menu(&self) -> MenuQueries<'a, DatabaseTransaction> {
        MenuQueries::new(self.txn)
    }

    pub fn reservations(&self) -> ReservationQueries<'a, DatabaseTransaction> {
        ReservationQueries::new(self.txn)
    }

    pub fn orders(&self) -> OrderQueries<'a, DatabaseTransaction> {
        OrderQueries::new(self.txn)
    }

    pub fn reviews(&self) -> ReviewQueries<'a, DatabaseTransaction> {
        ReviewQueries::new(self.txn)
    }
}

/// Database-backed Unit of Work.
pub struct Persistence {
    db: DatabaseConnection,
    accounts: Arc<AccountStore>,
    menu: Arc<MenuStore>,
    reservations: Arc<ReservationStore>,
    orders: Arc<OrderStore>,
    reviews: Arc<ReviewStore>,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            accounts: Arc::new(AccountStore::new(db.clone())),
            menu: Arc::new(MenuStore::new(db.clone())),
            reservations: Arc::new(ReservationStore::new(db.clone())),
            orders: Arc::new(OrderStore::new(db.clone())),
            reviews: Arc::new(ReviewStore::new(db.clone())),
            db,
        }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
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

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        let txn = self.db.begin().await.map_err(AppError::from)?;

        let result = f(TransactionContext::new(&txn)).await;

        match result {
            Ok(value) => {
                txn.commit().await.map_err(AppError::from)?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

/// Run a block inside `$uow.transaction`, with `$ctx` bound to the context.
#[macro_export]
macro_rules! with_transaction {
    ($uow:expr, |$ctx:ident| $body:expr) => {
        $uow.transaction(|$ctx| Box::pin(async move { $body })).await
    };
}
