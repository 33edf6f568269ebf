//! Access decisions for role-gated operations.
//!
//! `authorize` is a pure capability check: it never touches the request and
//! never fails, it only says whether to proceed or where to send the actor.

use crate::config::LOGIN_PATH;

use super::user::{Actor, Role};

/// Outcome of an access check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Proceed,
    Redirect(Denial),
}

/// Where a refused actor is sent, and what they are told.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denial {
    pub to: &'static str,
    pub notice: &'static str,
}

pub const LOGIN_REQUIRED: &str = "Vous devez être connecté pour accéder à cette page.";
pub const CLIENTS_ONLY: &str = "Cette page est réservée aux clients.";
pub const STAFF_ONLY: &str = "Cette page est réservée au personnel.";

/// Decide whether `actor` may run an operation open to `allowed`.
///
/// Anonymous requests go to the login page; an actor with the wrong role goes
/// to the landing page of their own role.
pub fn authorize(actor: Option<&Actor>, allowed: &[Role]) -> Access {
    let Some(actor) = actor else {
        return Access::Redirect(Denial {
            to: LOGIN_PATH,
            notice: LOGIN_REQUIRED,
        });
    };

    if allowed.contains(&actor.role) {
        return Access::Proceed;
    }

    let notice = if allowed.contains(&Role::Client) {
        CLIENTS_ONLY
    } else {
        STAFF_ONLY
    };

    Access::Redirect(Denial {
        to: actor.role.landing_path(),
        notice,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn actor(role: Role) -> Actor {
        Actor {
            user_id: Uuid::new_v4(),
            username: "camille".to_string(),
            role,
        }
    }

    #[test]
    fn test_anonymous_goes_to_login() {
        assert_eq!(
            authorize(None, &[Role::Client]),
            Access::Redirect(Denial {
                to: "/login",
                notice: LOGIN_REQUIRED
            })
        );
    }

    #[test]
    fn test_allowed_role_proceeds() {
        let client = actor(Role::Client);
        let employee = actor(Role::Employee);

        assert_eq!(authorize(Some(&client), &[Role::Client]), Access::Proceed);
        assert_eq!(
            authorize(Some(&employee), &[Role::Client, Role::Employee]),
            Access::Proceed
        );
    }

    #[test]
    fn test_client_on_staff_page_goes_to_client_landing() {
        let client = actor(Role::Client);

        assert_eq!(
            authorize(Some(&client), &[Role::Employee]),
            Access::Redirect(Denial {
                to: "/mon_compte",
                notice: STAFF_ONLY
            })
        );
    }

    #[test]
    fn test_employee_on_client_page_goes_to_staff_landing() {
        let employee = actor(Role::Employee);

        assert_eq!(
            authorize(Some(&employee), &[Role::Client]),
            Access::Redirect(Denial {
                to: "/mon_compte_employe",
                notice: CLIENTS_ONLY
            })
        );
    }
}
