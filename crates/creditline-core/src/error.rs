use thiserror::Error;

use crate::models::{CreditStatus, TransitionAction};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("credit line not found: {id}")]
    NotFound { id: String },

    #[error("cannot {action} credit line with status '{current}'")]
    InvalidTransition {
        current: CreditStatus,
        action: TransitionAction,
    },

    #[error("credit line already exists: {id}")]
    AlreadyExists { id: String },

    #[error("credit line id must not be blank")]
    InvalidId,

    /// Backing store failure. Never produced by the in-memory registry.
    #[error("credit line storage failure: {0}")]
    Storage(String),
}

pub type RegistryResult<T> = Result<T, RegistryError>;
