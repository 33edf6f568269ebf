//! Repository layer - Data access abstraction
//!
//! Each aggregate has a repository trait for pooled reads and writes, a
//! `*Store` implementing it, and `*Queries` that run the same statements on
//! any connection, including an open transaction.

mod accounts;
pub(crate) mod entities;
mod menu;
mod orders;
mod reservations;
mod reviews;

pub use accounts::{AccountQueries, AccountRepository, AccountStore};
pub use menu::{MenuQueries, MenuRepository, MenuStore, NewDish};
pub use orders::{OrderQueries, OrderRepository, OrderStore};
pub use reservations::{ReservationQueries, ReservationRepository, ReservationStore};
pub use reviews::{ReviewQueries, ReviewRepository, ReviewStore};

#[cfg(any(test, feature = "test-utils"))]
pub use accounts::MockAccountRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use menu::MockMenuRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use orders::MockOrderRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use reservations::MockReservationRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use reviews::MockReviewRepository;
