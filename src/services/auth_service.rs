//! Authentication: registration, login and signed session tokens.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

use super::account_service::assign_role;
use crate::config::{Config, SECONDS_PER_HOUR};
use crate::domain::{username_problem, Account, Actor, NewUser, Password, Registration, Role};
use crate::errors::{AppError, AppResult, FieldErrors};
use crate::infra::UnitOfWork;
use crate::with_transaction;

/// Verified against when the username is unknown, so a miss costs as much as a hit.
static DUMMY_HASH: Lazy<Option<String>> = Lazy::new(|| {
    Password::new("placeholder-password-41", "nobody")
        .ok()
        .map(Password::into_string)
});

/// Signed session payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid,
    pub username: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

/// An opened session: the token to store in the cookie and who it belongs to.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub expires_in: i64,
    pub actor: Actor,
}

impl Session {
    pub fn landing_path(&self) -> &'static str {
        self.actor.role.landing_path()
    }
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create a user with its profile, applying the role hooks.
    async fn register(&self, registration: Registration) -> AppResult<Account>;

    async fn login(&self, username: String, password: String) -> AppResult<Session>;

    fn open_session(&self, account: &Account) -> AppResult<Session>;

    fn verify_session(&self, token: &str) -> AppResult<SessionClaims>;
}

pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(uow: Arc<U>, config: Config) -> Self {
        Self { uow, config }
    }

    async fn check_registration(&self, registration: &Registration) -> AppResult<()> {
        let mut errors = FieldErrors::new();

        if let Some(problem) = username_problem(&registration.username) {
            errors.add("username", problem);
        }

        let weak = Password::strength_problems(&registration.password, &registration.username);
        for problem in weak {
            errors.add("password1", problem);
        }

        if registration.password != registration.password_confirmation {
            errors.add("password2", "Les deux mots de passe ne correspondent pas.");
        }

        if registration.role == Role::Employee && !self.config.open_staff_signup {
            errors.add(
                "role",
                "Les comptes employés sont créés par la direction.",
            );
        }

        if self
            .uow
            .accounts()
            .username_taken(&registration.username)
            .await?
        {
            errors.add("username", "Ce nom d'utilisateur est déjà pris.");
        }

        errors.into_result()
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn register(&self, registration: Registration) -> AppResult<Account> {
        self.check_registration(&registration).await?;

        let password_hash =
            Password::new(&registration.password, &registration.username)?.into_string();
        let new_user = NewUser {
            username: registration.username,
            email: registration.email,
            first_name: String::new(),
            last_name: String::new(),
            password_hash,
        };
        let role = registration.role;
        let today = chrono::Local::now().date_naive();

        let account = with_transaction!(self.uow, |ctx| {
            let accounts = ctx.accounts();
            let user = accounts.insert_user(new_user).await?;
            let profile = accounts.insert_profile(user.id).await?;
            let profile = assign_role(&accounts, profile, role, today).await?;
            Ok(Account { user, profile })
        })?;

        tracing::info!(
            username = %account.user.username,
            role = %account.profile.role,
            "account registered"
        );
        Ok(account)
    }

    async fn login(&self, username: String, password: String) -> AppResult<Session> {
        let account = self.uow.accounts().find_account_by_username(&username).await?;

        let stored = match &account {
            Some(account) => Password::from_hash(account.user.password_hash.as_str()),
            None => Password::from_hash(DUMMY_HASH.as_deref().unwrap_or_default()),
        };
        let password_valid = stored.verify(&password);

        match account {
            Some(account) if password_valid => {
                tracing::info!(username = %account.user.username, "login succeeded");
                self.open_session(&account)
            }
            _ => {
                tracing::info!(%username, "login refused");
                Err(AppError::InvalidCredentials)
            }
        }
    }

    fn open_session(&self, account: &Account) -> AppResult<Session> {
        let now = Utc::now();
        let expires_at = now + Duration::hours(self.config.session_hours);
        let actor = account.actor();

        let claims = SessionClaims {
            sub: actor.user_id,
            username: actor.username.clone(),
            role: actor.role.to_string(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.session_secret_bytes()),
        )?;

        Ok(Session {
            token,
            expires_in: self.config.session_hours * SECONDS_PER_HOUR,
            actor,
        })
    }

    fn verify_session(&self, token: &str) -> AppResult<SessionClaims> {
        let data = decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(self.config.session_secret_bytes()),
            &Validation::default(),
        )?;

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::{Profile, User};
    use crate::services::testing::{SharedTestUnitOfWork, TestUnitOfWork};

    const SECRET: &str = "test-secret-key-for-testing-only-32chars";

    fn authenticator(uow: TestUnitOfWork) -> Authenticator<SharedTestUnitOfWork> {
        Authenticator::new(
            uow.into_shared(),
            Config::with_secret("sqlite::memory:", SECRET),
        )
    }

    fn account(username: &str, password: &str, role: Role) -> Account {
        let user_id = Uuid::new_v4();
        Account {
            user: User {
                id: user_id,
                username: username.to_string(),
                email: format!("{}@example.com", username),
                first_name: String::new(),
                last_name: String::new(),
                password_hash: Password::new(password, username).unwrap().into_string(),
                created_at: Utc::now(),
            },
            profile: Profile {
                id: Uuid::new_v4(),
                user_id,
                role,
                phone: None,
                points: 0,
                created_at: Utc::now(),
            },
        }
    }

    #[tokio::test]
    async fn test_login_opens_session_for_the_account_role() {
        let stored = account("camille", "Gratin-Dauphinois-7", Role::Employee);
        let expected_id = stored.user.id;

        let mut uow = TestUnitOfWork::default();
        uow.accounts
            .expect_find_account_by_username()
            .returning(move |_| Ok(Some(stored.clone())));

        let auth = authenticator(uow);
        let session = auth
            .login("camille".to_string(), "Gratin-Dauphinois-7".to_string())
            .await
            .unwrap();

        assert_eq!(session.actor.user_id, expected_id);
        assert_eq!(session.landing_path(), Role::Employee.landing_path());

        let claims = auth.verify_session(&session.token).unwrap();
        assert_eq!(claims.sub, expected_id);
        assert_eq!(claims.role, "employee");
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user_look_the_same() {
        let stored = account("camille", "Gratin-Dauphinois-7", Role::Client);

        let mut uow = TestUnitOfWork::default();
        uow.accounts
            .expect_find_account_by_username()
            .returning(move |username| {
                Ok((username == "camille").then(|| stored.clone()))
            });

        let auth = authenticator(uow);
        let wrong_password = auth
            .login("camille".to_string(), "Blanquette-42!".to_string())
            .await;
        let unknown_user = auth
            .login("dominique".to_string(), "Gratin-Dauphinois-7".to_string())
            .await;

        assert!(matches!(wrong_password, Err(AppError::InvalidCredentials)));
        assert!(matches!(unknown_user, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_registration_problems_are_reported_together() {
        let mut uow = TestUnitOfWork::default();
        uow.accounts
            .expect_username_taken()
            .returning(|_| Ok(true));

        let result = authenticator(uow)
            .register(Registration {
                username: "camille".to_string(),
                email: "camille@example.com".to_string(),
                password: "1234".to_string(),
                password_confirmation: "12345".to_string(),
                role: Role::Employee,
            })
            .await;

        let Err(AppError::InvalidFields(fields)) = result else {
            panic!("invalid registration was accepted");
        };
        let mut names: Vec<&str> = fields.fields().collect();
        names.sort_unstable();
        assert_eq!(names, vec!["password1", "password2", "role", "username"]);
        // too short and all digits
        assert_eq!(fields.get("password1").map(|m| m.len()), Some(2));
    }

    #[tokio::test]
    async fn test_username_with_spaces_is_refused() {
        let mut uow = TestUnitOfWork::default();
        uow.accounts
            .expect_username_taken()
            .returning(|_| Ok(false));

        let result = authenticator(uow)
            .register(Registration {
                username: "jean dupont".to_string(),
                email: "jean@example.com".to_string(),
                password: "Gratin-Dauphinois-7".to_string(),
                password_confirmation: "Gratin-Dauphinois-7".to_string(),
                role: Role::Client,
            })
            .await;

        let Err(AppError::InvalidFields(fields)) = result else {
            panic!("username with spaces was accepted");
        };
        let names: Vec<&str> = fields.fields().collect();
        assert_eq!(names, vec!["username"]);
    }

    #[test]
    fn test_token_signed_with_another_secret_is_rejected() {
        let stored = account("camille", "Gratin-Dauphinois-7", Role::Client);
        let other = Authenticator::new(
            TestUnitOfWork::default().into_shared(),
            Config::with_secret("sqlite::memory:", "another-secret-key-that-is-32-chars"),
        );
        let session = other.open_session(&stored).unwrap();

        assert!(authenticator(TestUnitOfWork::default())
            .verify_session(&session.token)
            .is_err());
    }
}
