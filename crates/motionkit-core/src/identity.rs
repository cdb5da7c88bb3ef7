//! Object identity tokens
//!
//! Observers and notifying objects are identified by opaque tokens rather than
//! by their contents. Two tokens are equal only if one was copied from the other.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identity of an observer or a notifying object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId(Uuid);

impl ObjectId {
    /// Create a new unique identity
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Obj({})", &self.0.to_string()[..8])
    }
}
