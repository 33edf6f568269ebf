//! Application services layer - use cases over the domain and the Unit of Work.
//!
//! Every service is a trait with one Unit of Work backed implementation, so
//! handlers depend on the trait and tests swap in mocks.

mod account_service;
mod auth_service;
pub mod container;
mod menu_service;
mod order_service;
mod reservation_service;
mod review_service;

#[cfg(test)]
pub(crate) mod testing;

pub use container::{parallel, ServiceContainer, Services};

pub use account_service::{AccountManager, AccountService, ClientDashboard, EmployeeRecord};
pub use auth_service::{AuthService, Authenticator, Session, SessionClaims};
pub use menu_service::{MenuCatalog, MenuService};
pub use order_service::{OrderDesk, OrderService};
pub use reservation_service::{ReservationDesk, ReservationService};
pub use review_service::{ReviewBoard, ReviewService};

#[cfg(any(test, feature = "test-utils"))]
pub use account_service::MockAccountService;
#[cfg(any(test, feature = "test-utils"))]
pub use auth_service::MockAuthService;
#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
#[cfg(any(test, feature = "test-utils"))]
pub use menu_service::MockMenuService;
#[cfg(any(test, feature = "test-utils"))]
pub use order_service::MockOrderService;
#[cfg(any(test, feature = "test-utils"))]
pub use reservation_service::MockReservationService;
#[cfg(any(test, feature = "test-utils"))]
pub use review_service::MockReviewService;
