//! Infrastructure layer - database connection, migrations, repositories and
//! the Unit of Work that coordinates them.

pub mod db;
pub mod repositories;
pub mod unit_of_work;

pub use db::{Database, Migrator};
pub use repositories::{
    AccountQueries, AccountRepository, AccountStore, MenuQueries, MenuRepository, MenuStore,
    NewDish, OrderQueries, OrderRepository, OrderStore, ReservationQueries, ReservationRepository,
    ReservationStore, ReviewQueries, ReviewRepository, ReviewStore,
};
pub use unit_of_work::{Persistence, TransactionContext, TxFuture, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{
    MockAccountRepository, MockMenuRepository, MockOrderRepository, MockReservationRepository,
    MockReviewRepository,
};
