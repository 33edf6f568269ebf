//! Domain layer - restaurant rules independent of storage and HTTP.
//!
//! Money, roles and access decisions, the booking window, order pricing and
//! status machine, loyalty accrual and the review comment filter.

pub mod access;
pub mod employee;
pub mod menu;
pub mod money;
pub mod order;
pub mod password;
pub mod reservation;
pub mod review;
pub mod user;

pub use access::{authorize, Access, Denial};
pub use employee::{ContractType, EmployeeInfo, Position, ScheduleEntry, Shift, Weekday, WeeklySchedule};
pub use menu::{group_menu, Category, CategoryKind, DiningTable, Dish, MenuDish, MenuSection};
pub use money::Money;
pub use order::{
    normalize_cart, parse_cart, quote, CartError, CartItem, LoyaltyPolicy, Order, OrderDetails,
    OrderError, OrderLine, OrderLineDetails, OrderQuote, OrderStatus, PaymentMode, PlaceOrder,
    PlacedOrder, PricedLine,
};
pub use password::Password;
pub use reservation::{
    NewReservation, Reservation, ReservationDetails, ReservationError, ReservationRules, Slot,
};
pub use review::{
    CommentFilter, CommentIssue, NewReview, Rating, Review, ReviewDetails, ReviewHeuristics,
};
pub use user::{
    username_problem, Account, Actor, ContactUpdate, EmergencyContact, NewUser, Profile,
    Registration, Role, User,
};
