//! Seed command - demo tables and a starter menu.
//!
//! Each part is only created when its table is empty, so running the command
//! twice changes nothing.

use crate::config::{Config, DEFAULT_TABLE_SEATS};
use crate::domain::{CategoryKind, Money};
use crate::errors::AppResult;
use crate::infra::{Database, NewDish, Persistence, UnitOfWork};
use crate::with_transaction;

const DEMO_TABLES: i32 = 10;

type SeedDish = (&'static str, &'static str, i64);

const STARTER_MENU: &[(&str, CategoryKind, &[SeedDish])] = &[
    (
        "Entrées",
        CategoryKind::Starter,
        &[
            ("Soupe à l'oignon", "Gratinée au comté", 850),
            ("Œuf mayonnaise", "Mayonnaise maison, pickles", 650),
            ("Terrine de campagne", "Cornichons et pain grillé", 900),
        ],
    ),
    (
        "Plats",
        CategoryKind::Main,
        &[
            ("Bœuf bourguignon", "Carottes fondantes, pommes vapeur", 1950),
            ("Confit de canard", "Pommes sarladaises", 2100),
            ("Blanquette de veau", "Riz pilaf", 1850),
        ],
    ),
    (
        "Desserts",
        CategoryKind::Dessert,
        &[
            ("Crème brûlée", "Vanille de Madagascar", 750),
            ("Tarte Tatin", "Crème fraîche d'Isigny", 800),
            ("Mousse au chocolat", "Chocolat noir 70 %", 700),
        ],
    ),
];

/// What a seed run created.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub tables: usize,
    pub categories: usize,
    pub dishes: usize,
}

/// Execute the seed command
pub async fn execute(config: Config) -> AppResult<()> {
    let db = Database::connect(&config).await?;
    let uow = Persistence::new(db.get_connection());

    let summary = seed_demo(&uow).await?;

    tracing::info!(
        tables = summary.tables,
        categories = summary.categories,
        dishes = summary.dishes,
        "Seed completed"
    );
    Ok(())
}

/// Create the demo tables and the starter menu where nothing exists yet.
pub async fn seed_demo<U: UnitOfWork>(uow: &U) -> AppResult<SeedSummary> {
    with_transaction!(uow, |ctx| {
        let menu = ctx.menu();
        let mut summary = SeedSummary::default();

        if menu.count_tables().await? == 0 {
            for number in 1..=DEMO_TABLES {
                let seats = match number % 3 {
                    0 => 6,
                    1 => 2,
                    _ => DEFAULT_TABLE_SEATS,
                };
                menu.insert_table(number, seats).await?;
                summary.tables += 1;
            }
        }

        if menu.list_categories().await?.is_empty() {
            for (name, kind, dishes) in STARTER_MENU {
                let category = menu.insert_category(name, *kind).await?;
                summary.categories += 1;

                for (dish_name, description, cents) in dishes.iter() {
                    menu.insert_dish(NewDish {
                        name: dish_name.to_string(),
                        description: description.to_string(),
                        price: Money::from_cents(*cents),
                        category_id: category.id,
                    })
                    .await?;
                    summary.dishes += 1;
                }
            }
        }

        Ok(summary)
    })
}
