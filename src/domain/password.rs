//! Password value object.
//!
//! Plain text never outlives `Password::new`; only the Argon2 PHC string is kept.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::config::MIN_PASSWORD_LENGTH;
use crate::errors::{AppError, AppResult, FieldErrors};

/// Hashed password.
#[derive(Clone, PartialEq, Eq)]
pub struct Password {
    hash: String,
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Password").field("hash", &"[REDACTED]").finish()
    }
}

impl Password {
    /// Check the strength rules, then hash.
    ///
    /// Rules: at least `MIN_PASSWORD_LENGTH` characters, not only digits,
    /// and different from the username.
    pub fn new(plain_text: &str, username: &str) -> AppResult<Self> {
        let problems = Self::strength_problems(plain_text, username);
        if !problems.is_empty() {
            let mut errors = FieldErrors::new();
            for problem in problems {
                errors.add("password1", problem);
            }
            return Err(errors.into());
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(plain_text.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hash failed: {}", e)))?
            .to_string();

        Ok(Self { hash })
    }

    /// Wrap a hash loaded from storage.
    pub fn from_hash(hash: impl Into<String>) -> Self {
        Self { hash: hash.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.hash
    }

    pub fn into_string(self) -> String {
        self.hash
    }

    /// Constant-time comparison through Argon2; a malformed hash never matches.
    pub fn verify(&self, plain_text: &str) -> bool {
        PasswordHash::new(&self.hash)
            .map(|parsed| {
                Argon2::default()
                    .verify_password(plain_text.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    }

    pub(crate) fn strength_problems(plain_text: &str, username: &str) -> Vec<String> {
        let mut problems = Vec::new();

        if plain_text.chars().count() < MIN_PASSWORD_LENGTH {
            problems.push(format!(
                "Le mot de passe doit contenir au moins {} caractères.",
                MIN_PASSWORD_LENGTH
            ));
        }
        if !plain_text.is_empty() && plain_text.chars().all(|c| c.is_ascii_digit()) {
            problems.push("Le mot de passe ne peut pas être entièrement numérique.".to_string());
        }
        if !username.is_empty() && plain_text.eq_ignore_ascii_case(username) {
            problems.push("Le mot de passe est trop semblable au nom d'utilisateur.".to_string());
        }

        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let password = Password::new("ragout-de-boeuf", "marie").unwrap();

        assert!(password.verify("ragout-de-boeuf"));
        assert!(!password.verify("ragout-de-veau"));
    }

    #[test]
    fn test_restored_hash_still_verifies() {
        let stored = Password::new("tarte-tatin-42", "paul").unwrap().into_string();

        assert!(Password::from_hash(stored).verify("tarte-tatin-42"));
    }

    #[test]
    fn test_salts_differ() {
        let first = Password::new("creme-brulee", "lea").unwrap();
        let second = Password::new("creme-brulee", "lea").unwrap();

        assert_ne!(first.as_str(), second.as_str());
    }

    #[test]
    fn test_short_password_reports_on_password_field() {
        match Password::new("court", "lea") {
            Err(AppError::InvalidFields(fields)) => {
                assert_eq!(fields.get("password1").map(|m| m.len()), Some(1));
            }
            other => panic!("expected field errors, got {:?}", other),
        }
    }

    #[test]
    fn test_numeric_password_rejected() {
        assert!(Password::new("12345678", "lea").is_err());
    }

    #[test]
    fn test_password_equal_to_username_rejected() {
        assert!(Password::new("bernadette", "Bernadette").is_err());
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        assert!(!Password::from_hash("not-a-phc-string").verify("anything"));
    }
}
