//! Application state - dependency injection container.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::Database;
use crate::services::{
    AccountService, AuthService, MenuService, OrderService, ReservationService, ReviewService,
    ServiceContainer, Services,
};

/// Everything a handler needs, cheap to clone per request.
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<dyn ServiceContainer>,
    pub database: Arc<Database>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wire the production services on `database`.
    pub fn from_config(database: Arc<Database>, config: Config) -> Self {
        let services = Services::from_connection(database.get_connection(), &config);
        Self::new(Arc::new(services), database, config)
    }

    /// State over manually injected services (tests use mocks here).
    pub fn new(services: Arc<dyn ServiceContainer>, database: Arc<Database>, config: Config) -> Self {
        Self {
            services,
            database,
            config: Arc::new(config),
        }
    }

    pub fn auth(&self) -> Arc<dyn AuthService> {
        self.services.auth()
    }

    pub fn accounts(&self) -> Arc<dyn AccountService> {
        self.services.accounts()
    }

    pub fn menu(&self) -> Arc<dyn MenuService> {
        self.services.menu()
    }

    pub fn reservations(&self) -> Arc<dyn ReservationService> {
        self.services.reservations()
    }

    pub fn orders(&self) -> Arc<dyn OrderService> {
        self.services.orders()
    }

    pub fn reviews(&self) -> Arc<dyn ReviewService> {
        self.services.reviews()
    }
}
