//! Authentication handlers: login, registration, logout.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedForm;
use crate::api::flash::{FlashRedirect, Flashes};
use crate::api::middleware::MaybeActor;
use crate::api::session::{logout_cookie, session_cookie};
use crate::api::AppState;
use crate::config::{HOME_PATH, LOGIN_PATH, MIN_PASSWORD_LENGTH, ROLE_CLIENT};
use crate::domain::{Registration, Role};
use crate::errors::{AppError, AppResult};

/// Login form
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginForm {
    #[validate(length(min = 1, message = "Ce champ est obligatoire."))]
    #[schema(example = "jdupont")]
    pub username: String,
    #[validate(length(min = 1, message = "Ce champ est obligatoire."))]
    pub password: String,
}

/// Registration form
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterForm {
    #[validate(length(
        min = 3,
        max = 150,
        message = "Le nom d'utilisateur doit contenir entre 3 et 150 caractères."
    ))]
    #[schema(example = "jdupont")]
    pub username: String,
    #[validate(email(message = "Adresse email invalide."))]
    #[schema(example = "jeanne@dupont.fr")]
    pub email: String,
    #[schema(min_length = 8)]
    pub password1: String,
    pub password2: String,
    /// `client` or `employee`
    #[serde(default = "default_role")]
    #[schema(example = "client")]
    pub role: String,
}

fn default_role() -> String {
    ROLE_CLIENT.to_string()
}

/// What a login or registration page needs to draw its form.
#[derive(Debug, Serialize)]
pub struct FormView {
    pub action: &'static str,
    pub fields: &'static [&'static str],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_password_length: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<&'static str>,
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page).post(login))
        .route("/register", get(register_page).post(register))
        .route("/logout", get(logout).post(logout))
}

/// Login page
#[utoipa::path(
    get,
    path = "/login",
    tag = "Authentication",
    responses(
        (status = 200, description = "Login form"),
        (status = 303, description = "Already signed in, sent home")
    )
)]
pub async fn login_page(MaybeActor(actor): MaybeActor, flashes: Flashes) -> Response {
    if actor.is_some() {
        return FlashRedirect::to(HOME_PATH).into_response();
    }

    flashes
        .render(FormView {
            action: LOGIN_PATH,
            fields: &["username", "password"],
            min_password_length: None,
            roles: Vec::new(),
        })
        .into_response()
}

/// Sign in and open a session
#[utoipa::path(
    post,
    path = "/login",
    tag = "Authentication",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Session cookie set, sent to the role landing page; on bad credentials sent back to /login with a notice"),
        (status = 400, description = "Malformed form")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    MaybeActor(actor): MaybeActor,
    ValidatedForm(form): ValidatedForm<LoginForm>,
) -> AppResult<FlashRedirect> {
    if actor.is_some() {
        return Ok(FlashRedirect::to(HOME_PATH));
    }

    match state.auth().login(form.username, form.password).await {
        Ok(session) => {
            let landing = session.landing_path();
            let cookie =
                session_cookie(session.token, session.expires_in, state.config.secure_cookies);
            Ok(FlashRedirect::to(landing).with_cookie(cookie))
        }
        Err(AppError::InvalidCredentials) => Ok(FlashRedirect::error(
            LOGIN_PATH,
            AppError::InvalidCredentials.to_string(),
        )),
        Err(e) => Err(e),
    }
}

/// Registration page
#[utoipa::path(
    get,
    path = "/register",
    tag = "Authentication",
    responses(
        (status = 200, description = "Registration form"),
        (status = 303, description = "Already signed in, sent home")
    )
)]
pub async fn register_page(
    State(state): State<AppState>,
    MaybeActor(actor): MaybeActor,
    flashes: Flashes,
) -> Response {
    if actor.is_some() {
        return FlashRedirect::to(HOME_PATH).into_response();
    }

    let mut roles = vec![Role::Client.as_str()];
    if state.config.open_staff_signup {
        roles.push(Role::Employee.as_str());
    }

    flashes
        .render(FormView {
            action: "/register",
            fields: &["username", "email", "password1", "password2", "role"],
            min_password_length: Some(MIN_PASSWORD_LENGTH),
            roles,
        })
        .into_response()
}

/// Create an account and sign in
#[utoipa::path(
    post,
    path = "/register",
    tag = "Authentication",
    request_body(content = RegisterForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Account created, session opened, sent home"),
        (status = 422, description = "Field errors (username taken, passwords differ, weak password...)")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    MaybeActor(actor): MaybeActor,
    ValidatedForm(form): ValidatedForm<RegisterForm>,
) -> AppResult<FlashRedirect> {
    if actor.is_some() {
        return Ok(FlashRedirect::to(HOME_PATH));
    }

    let role: Role = form.role.parse()?;
    let auth = state.auth();
    let account = auth
        .register(Registration {
            username: form.username.trim().to_string(),
            email: form.email.trim().to_string(),
            password: form.password1,
            password_confirmation: form.password2,
            role,
        })
        .await?;

    let session = auth.open_session(&account)?;
    let cookie = session_cookie(session.token, session.expires_in, state.config.secure_cookies);

    Ok(FlashRedirect::success(HOME_PATH, "Compte créé avec succès !").with_cookie(cookie))
}

/// Close the session
#[utoipa::path(
    post,
    path = "/logout",
    tag = "Authentication",
    responses((status = 303, description = "Session cookie cleared, sent home"))
)]
pub async fn logout(State(state): State<AppState>, MaybeActor(actor): MaybeActor) -> FlashRedirect {
    if let Some(actor) = actor {
        tracing::info!(username = %actor.username, "logout");
    }

    FlashRedirect::info(HOME_PATH, "Vous êtes déconnecté.")
        .with_cookie(logout_cookie(state.config.secure_cookies))
}
