//! SeaORM entity definitions
//!
//! Storage rows, kept apart from the domain types they convert into.

pub mod category;
pub mod dining_table;
pub mod dish;
pub mod employee_info;
pub mod order;
pub mod order_line;
pub mod profile;
pub mod reservation;
pub mod review;
pub mod user;
