//! API middleware and request guards.

mod auth;

pub use auth::{
    session_middleware, Authorized, ClientOnly, EmployeeOnly, MaybeActor, Member, RoleSet,
};
