//! The public menu and the list of bookable tables.

use std::sync::Arc;

use async_trait::async_trait;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

use crate::domain::{group_menu, DiningTable, MenuSection};
use crate::errors::AppResult;
use crate::infra::UnitOfWork;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait MenuService: Send + Sync {
    /// Available dishes grouped by course.
    async fn menu(&self) -> AppResult<Vec<MenuSection>>;

    async fn tables(&self) -> AppResult<Vec<DiningTable>>;
}

pub struct MenuCatalog<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> MenuCatalog<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> MenuService for MenuCatalog<U> {
    async fn menu(&self) -> AppResult<Vec<MenuSection>> {
        let menu = self.uow.menu();
        let (categories, dishes) =
            tokio::try_join!(menu.list_categories(), menu.list_available_dishes())?;

        Ok(group_menu(&categories, dishes))
    }

    async fn tables(&self) -> AppResult<Vec<DiningTable>> {
        self.uow.menu().list_tables().await
    }
}
