//! Session authentication and role guards.

use std::convert::Infallible;
use std::marker::PhantomData;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{
        header::{CACHE_CONTROL, EXPIRES, PRAGMA},
        request::Parts,
        HeaderMap, HeaderValue,
    },
    middleware::Next,
    response::Response,
};

use crate::api::flash::FlashRedirect;
use crate::api::session::session_token;
use crate::api::AppState;
use crate::config::LOGIN_PATH;
use crate::domain::{authorize, Access, Actor, Role};

/// Session middleware.
///
/// Resolves the session token to an `Actor` and stores it in the request
/// extensions. It never rejects: anonymous requests pass through and the
/// handlers' guards decide. The role is re-read from the profile on every
/// request so a promotion takes effect without logging in again.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let actor = match session_token(request.headers()) {
        Some(token) => resolve_actor(&state, &token).await,
        None => None,
    };

    let authenticated = actor.is_some();
    if let Some(actor) = actor {
        request.extensions_mut().insert(actor);
    }

    let mut response = next.run(request).await;
    if authenticated {
        disable_caching(response.headers_mut());
    }
    response
}

async fn resolve_actor(state: &AppState, token: &str) -> Option<Actor> {
    let claims = match state.auth().verify_session(token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::warn!(error = %e, "Session token rejected");
            return None;
        }
    };

    match state.accounts().actor(claims.sub).await {
        Ok(Some(actor)) => Some(actor),
        Ok(None) => {
            tracing::warn!(user_id = %claims.sub, "Session for a deleted user");
            None
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to load session actor");
            None
        }
    }
}

/// Pages behind a login must not be served from a shared or back/forward cache.
fn disable_caching(headers: &mut HeaderMap) {
    headers.insert(
        CACHE_CONTROL,
        HeaderValue::from_static("no-store, no-cache, must-revalidate, max-age=0"),
    );
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(EXPIRES, HeaderValue::from_static("0"));
}

/// Roles allowed through an `Authorized` guard.
pub trait RoleSet: Send + Sync + 'static {
    const ROLES: &'static [Role];
}

pub struct ClientOnly;

impl RoleSet for ClientOnly {
    const ROLES: &'static [Role] = &[Role::Client];
}

pub struct EmployeeOnly;

impl RoleSet for EmployeeOnly {
    const ROLES: &'static [Role] = &[Role::Employee];
}

/// Any signed-in user.
pub struct Member;

impl RoleSet for Member {
    const ROLES: &'static [Role] = &[Role::Client, Role::Employee];
}

/// The current actor, present only if their role is in `R`.
///
/// Anyone else is redirected with a flash notice: anonymous requests to the
/// login page, signed-in users to their own landing page.
pub struct Authorized<R: RoleSet> {
    pub actor: Actor,
    _roles: PhantomData<R>,
}

impl<R: RoleSet> std::ops::Deref for Authorized<R> {
    type Target = Actor;

    fn deref(&self) -> &Self::Target {
        &self.actor
    }
}

#[async_trait]
impl<S, R> FromRequestParts<S> for Authorized<R>
where
    S: Send + Sync,
    R: RoleSet,
{
    type Rejection = FlashRedirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor = parts.extensions.get::<Actor>();

        match (authorize(actor, R::ROLES), actor) {
            (Access::Proceed, Some(actor)) => Ok(Authorized {
                actor: actor.clone(),
                _roles: PhantomData,
            }),
            (Access::Redirect(denial), _) => {
                tracing::debug!(to = denial.to, "Access denied");
                Err(denial.into())
            }
            (Access::Proceed, None) => Err(FlashRedirect::to(LOGIN_PATH)),
        }
    }
}

/// The current actor, if any. Never rejects.
pub struct MaybeActor(pub Option<Actor>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeActor
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeActor(parts.extensions.get::<Actor>().cloned()))
    }
}
