use serde::{Deserialize, Serialize};

use super::domain::{ActorId, ActorKind};

/// Directory view of an actor. Credential material never crosses this
/// boundary; the directory only answers who an id belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorRecord {
    pub id: ActorId,
    pub kind: ActorKind,
    pub display_name: String,
    pub contact: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
}

/// External identity directory. Resolution is used for attribution and
/// notification addressing only; the owner kind stored on items and
/// engagements is never re-derived through this port.
pub trait IdentityDirectory: Send + Sync {
    fn resolve(&self, id: &ActorId) -> Result<Option<ActorRecord>, DirectoryError>;
    /// Every provider-kind actor, for posting broadcasts.
    fn providers(&self) -> Result<Vec<ActorRecord>, DirectoryError>;
}

/// Directory lookup failure.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("identity directory unavailable: {0}")]
    Unavailable(String),
}
