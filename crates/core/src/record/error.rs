use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

/// Validation messages for one record, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }
}

/// Validation messages for a request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ValidationDetails {
    /// The body was a single object.
    Single(FieldErrors),
    /// The body was an array; only failing indices are present.
    Many(BTreeMap<usize, FieldErrors>),
}

/// Errors produced while turning a request body into records.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("invalid or missing JSON body")]
    InvalidBody,
    #[error("invalid delete payload")]
    InvalidDeletePayload,
    #[error("request body too large")]
    PayloadTooLarge,
    #[error("validation_failed")]
    Validation(ValidationDetails),
}

impl RequestError {
    /// Pure mapping to an HTTP status code.
    ///
    /// - `InvalidBody` -> 400
    /// - `InvalidDeletePayload` -> 400
    /// - `PayloadTooLarge` -> 413
    /// - `Validation` -> 422
    pub fn status_code(&self) -> u16 {
        match self {
            RequestError::InvalidBody | RequestError::InvalidDeletePayload => 400,
            RequestError::PayloadTooLarge => 413,
            RequestError::Validation(_) => 422,
        }
    }
}
