mod hash;

pub use self::hash::object_hash;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use placement_types::placement::{HashTag, PlacementApiStatus};

#[derive(Error, Debug)]
pub enum DiffError {
    #[error("unable to encode rendered object: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Rendered content that can be compared against a recorded hash
pub trait Changes {
    fn diff(&self, status: &PlacementApiStatus, tag: &HashTag) -> Result<Diff, DiffError>;
}

impl<T> Changes for T
where
    T: Serialize + ?Sized,
{
    fn diff(&self, status: &PlacementApiStatus, tag: &HashTag) -> Result<Diff, DiffError> {
        let current = object_hash(self)?;
        let diff = match status.get_hash(tag) {
            None => Diff::New(current),
            Some(previous) if previous == current => Diff::None,
            Some(previous) => Diff::Changed {
                previous: previous.to_owned(),
                current,
            },
        };
        debug!(%tag, ?diff, "hash diff");
        Ok(diff)
    }
}

// use Option as inspiration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diff {
    None,
    New(String),
    Changed { previous: String, current: String },
}

impl Diff {
    pub fn is_none(&self) -> bool {
        matches!(self, Diff::None)
    }

    pub fn is_new(&self) -> bool {
        matches!(self, Diff::New(_))
    }

    pub fn is_changed(&self) -> bool {
        matches!(self, Diff::Changed { .. })
    }

    /// dependent resource has to be regenerated
    pub fn needs_update(&self) -> bool {
        !self.is_none()
    }

    pub fn current(&self) -> Option<&str> {
        match self {
            Diff::None => None,
            Diff::New(current) | Diff::Changed { current, .. } => Some(current),
        }
    }

    /// record the new hash, call once the dependent resource was regenerated
    pub fn apply(self, status: &mut PlacementApiStatus, tag: &HashTag) -> bool {
        match self {
            Diff::None => false,
            Diff::New(current) | Diff::Changed { current, .. } => status.record_hash(tag, current),
        }
    }
}
