use std::sync::PoisonError;

use thiserror::Error;

use placement_types::{ItemMeta, ValidationError};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(ItemMeta),
    #[error("{0} already exists")]
    AlreadyExists(ItemMeta),
    #[error("Invalid spec: {0}")]
    Validation(#[from] ValidationError),
    #[error("lock poison error")]
    LockPoisoned,
}

impl StoreError {
    pub fn not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl<T> From<PoisonError<T>> for StoreError {
    fn from(_error: PoisonError<T>) -> Self {
        Self::LockPoisoned
    }
}
