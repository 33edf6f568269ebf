//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for exploring the pages and forms.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{
    account_handler, auth_handler, employee_handler, order_handler, public_handler,
    reservation_handler, review_handler,
};
use crate::config::SESSION_COOKIE;

/// OpenAPI documentation for the restaurant service
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bistrot",
        version = "0.1.0",
        description = "Restaurant management: menu, table reservations, orders with loyalty points, reviews and the staff console. Forms are posted URL-encoded and answered with a 303 redirect carrying a flash notice.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        // Pages
        public_handler::home,
        public_handler::menu,
        // Authentication
        auth_handler::login_page,
        auth_handler::login,
        auth_handler::register_page,
        auth_handler::register,
        auth_handler::logout,
        // Client account
        account_handler::client_account,
        account_handler::update_profile,
        // Reservations
        reservation_handler::booking_page,
        reservation_handler::book,
        reservation_handler::my_reservations,
        reservation_handler::cancel,
        // Orders
        order_handler::order_form,
        order_handler::order_quantities,
        order_handler::order_cart,
        order_handler::checkout_page,
        order_handler::checkout,
        order_handler::my_orders,
        // Reviews
        review_handler::list_reviews,
        review_handler::post_review,
        // Staff
        employee_handler::employee_account,
        employee_handler::update_employee_info,
        employee_handler::change_order_status,
    ),
    components(
        schemas(
            auth_handler::LoginForm,
            auth_handler::RegisterForm,
            account_handler::ContactForm,
            reservation_handler::ReservationForm,
            order_handler::QuantityForm,
            order_handler::CartForm,
            order_handler::CheckoutForm,
            review_handler::ReviewForm,
            employee_handler::EmployeeContactForm,
            employee_handler::StatusForm,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Pages", description = "Public pages"),
        (name = "Authentication", description = "Login, registration and logout"),
        (name = "Account", description = "Client account"),
        (name = "Reservations", description = "Table booking"),
        (name = "Orders", description = "Ordering and order history"),
        (name = "Reviews", description = "Customer reviews"),
        (name = "Staff", description = "Employee console")
    )
)]
pub struct ApiDoc;

/// Session cookie, with the bearer header as an alternative
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    SESSION_COOKIE,
                    "Signed session token set by POST /login",
                ))),
            );
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Same token as the session cookie"))
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_form_route_is_documented() {
        let doc = ApiDoc::openapi();

        for path in [
            "/login",
            "/register",
            "/reservations",
            "/annuler-reservation/{id}",
            "/commander",
            "/commander/valider",
            "/panier",
            "/avis",
            "/changer_statut_commande/{id}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{} is not documented", path);
        }
    }
}
