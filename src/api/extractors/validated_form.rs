//! Validated form extractor - URL-encoded body deserialization plus validation.

use axum::{
    async_trait,
    extract::{rejection::FormRejection, FromRequest, Request},
    Form,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use crate::errors::{AppError, FieldErrors};

/// Form body that passed its `validator` rules.
///
/// Rule failures are reported per field, keyed by the form field name.
///
/// ```rust,ignore
/// #[derive(Deserialize, Validate)]
/// struct LoginForm {
///     #[validate(length(min = 1, message = "Ce champ est obligatoire."))]
///     username: String,
///     password: String,
/// }
///
/// async fn login(ValidatedForm(form): ValidatedForm<LoginForm>) { /* ... */ }
/// ```
pub struct ValidatedForm<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedForm<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Form<T>: FromRequest<S, Rejection = FormRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Form(value) = Form::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::validation(e.body_text()))?;

        value.validate().map_err(field_errors)?;

        Ok(ValidatedForm(value))
    }
}

fn field_errors(errors: ValidationErrors) -> AppError {
    let mut fields = FieldErrors::new();
    for (field, errs) in errors.field_errors() {
        for e in errs {
            let message = e
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| "Valeur invalide.".to_string());
            fields.add(field.to_string(), message);
        }
    }
    AppError::InvalidFields(fields)
}
