//! Menu catalogue and dining room tables.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::money::Money;
use crate::errors::AppError;

/// Course a category belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    Starter,
    Main,
    Dessert,
}

impl CategoryKind {
    pub const ALL: [CategoryKind; 3] = [
        CategoryKind::Starter,
        CategoryKind::Main,
        CategoryKind::Dessert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryKind::Starter => "starter",
            CategoryKind::Main => "main",
            CategoryKind::Dessert => "dessert",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CategoryKind::Starter => "Entrées",
            CategoryKind::Main => "Plats",
            CategoryKind::Dessert => "Desserts",
        }
    }
}

impl FromStr for CategoryKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "starter" | "entree" => Ok(CategoryKind::Starter),
            "main" | "plat" => Ok(CategoryKind::Main),
            "dessert" => Ok(CategoryKind::Dessert),
            other => Err(AppError::internal(format!("unknown category kind '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub kind: CategoryKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dish {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub category_id: Uuid,
    pub image: Option<String>,
    pub available: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiningTable {
    pub id: Uuid,
    pub number: i32,
    pub seats: i32,
}

/// Dishes of one course, as listed on the menu.
#[derive(Debug, Clone, Serialize)]
pub struct MenuSection {
    pub kind: CategoryKind,
    pub label: &'static str,
    pub dishes: Vec<MenuDish>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MenuDish {
    #[serde(flatten)]
    pub dish: Dish,
    pub category: String,
}

/// Group available dishes by course, starters first; dishes are sorted by name.
///
/// Dishes whose category is unknown are left out.
pub fn group_menu(categories: &[Category], dishes: Vec<Dish>) -> Vec<MenuSection> {
    let mut sections: Vec<MenuSection> = CategoryKind::ALL
        .into_iter()
        .map(|kind| MenuSection {
            kind,
            label: kind.label(),
            dishes: Vec::new(),
        })
        .collect();

    for dish in dishes.into_iter().filter(|dish| dish.available) {
        let Some(category) = categories.iter().find(|c| c.id == dish.category_id) else {
            continue;
        };
        if let Some(section) = sections.iter_mut().find(|s| s.kind == category.kind) {
            section.dishes.push(MenuDish {
                dish,
                category: category.name.clone(),
            });
        }
    }

    for section in &mut sections {
        section.dishes.sort_by(|a, b| a.dish.name.cmp(&b.dish.name));
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(name: &str, kind: CategoryKind) -> Category {
        Category {
            id: Uuid::new_v4(),
            name: name.to_string(),
            kind,
        }
    }

    fn dish(name: &str, category: &Category, available: bool) -> Dish {
        Dish {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: String::new(),
            price: Money::from_cents(900),
            category_id: category.id,
            image: None,
            available,
        }
    }

    #[test]
    fn test_menu_groups_available_dishes_by_course() {
        let starters = category("Entrées froides", CategoryKind::Starter);
        let mains = category("Viandes", CategoryKind::Main);
        let dishes = vec![
            dish("Steak frites", &mains, true),
            dish("Blanquette", &mains, true),
            dish("Terrine", &starters, true),
            dish("Pot-au-feu", &mains, false),
        ];

        let menu = group_menu(&[starters, mains], dishes);

        assert_eq!(menu.len(), 3);
        assert_eq!(menu[0].kind, CategoryKind::Starter);
        assert_eq!(menu[0].dishes.len(), 1);
        let mains: Vec<_> = menu[1].dishes.iter().map(|d| d.dish.name.as_str()).collect();
        assert_eq!(mains, vec!["Blanquette", "Steak frites"]);
        assert!(menu[2].dishes.is_empty());
    }

    #[test]
    fn test_kind_accepts_legacy_codes() {
        assert_eq!("entree".parse::<CategoryKind>().unwrap(), CategoryKind::Starter);
        assert_eq!("plat".parse::<CategoryKind>().unwrap(), CategoryKind::Main);
        assert!("boisson".parse::<CategoryKind>().is_err());
    }
}
