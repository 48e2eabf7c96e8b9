//! The module contains the errors the engine can raise.
//!
//! Domain failures are a small closed set of variants so callers dispatch on
//! the tag, never on the message text:
//!
//! - [`NotFound`] for absent resources, including ownership failures on
//!   single-resource lookups (no existence leak for non-admins).
//! - [`Forbidden`] for authenticated principals lacking a permission.
//! - [`InsufficientBalance`] for expense creations/increases that would drive
//!   a balance negative.
//! - [`Conflict`] for duplicate emails on signup/profile update.
//!
//! [`NotFound`]: EngineError::NotFound
//! [`Forbidden`]: EngineError::Forbidden
//! [`InsufficientBalance`]: EngineError::InsufficientBalance
//! [`Conflict`]: EngineError::Conflict
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("Insufficient permissions: {0}")]
    Forbidden(String),
    #[error("Insufficient balance: {0}")]
    InsufficientBalance(String),
    #[error("{0} already registered")]
    Conflict(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid field: {0}")]
    InvalidField(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::InsufficientBalance(a), Self::InsufficientBalance(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidField(a), Self::InvalidField(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
