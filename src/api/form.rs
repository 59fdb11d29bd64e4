//! Form field extraction and validation
//!
//! Create/update/delete requests carry `application/x-www-form-urlencoded`
//! bodies. Fields are collected into a map so handlers can name exactly which
//! required field is missing.

use crate::error::AppError;
use axum::{
    async_trait,
    extract::{rejection::FormRejection, FromRequest, Request},
    Form,
};
use std::collections::HashMap;

/// Raw form fields of a request
///
/// A request without a form content type (e.g. a bare `DELETE`) yields an
/// empty field set, so validation reports the missing field instead of a
/// media-type error.
#[derive(Debug, Clone, Default)]
pub struct FormFields(pub HashMap<String, String>);

#[async_trait]
impl<S> FromRequest<S> for FormFields
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Form::<HashMap<String, String>>::from_request(req, state).await {
            Ok(Form(fields)) => Ok(Self(fields)),
            Err(FormRejection::InvalidFormContentType(_)) => Ok(Self::default()),
            Err(rejection) => Err(AppError::Validation(rejection.body_text())),
        }
    }
}

impl FormFields {
    /// Value of a field as submitted; blank values count as absent
    pub fn text(&self, field: &str) -> Option<&str> {
        self.0
            .get(field)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    /// Required text field, failing with `"<label> required"`
    pub fn require_text(&self, field: &str, label: &str) -> Result<&str, AppError> {
        self.text(field).ok_or_else(|| AppError::required(label))
    }

    /// Required integer id field
    pub fn require_id(&self, field: &str) -> Result<i64, AppError> {
        self.require_text(field, field)?
            .trim()
            .parse()
            .map_err(|_| AppError::Validation(format!("{} must be an integer", field)))
    }

    /// Required finite decimal field
    pub fn require_amount(&self, field: &str) -> Result<f64, AppError> {
        self.require_text(field, field)?
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|amount| amount.is_finite())
            .ok_or_else(|| AppError::Validation(format!("{} must be a number", field)))
    }
}
