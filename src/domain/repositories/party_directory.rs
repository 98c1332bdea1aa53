use async_trait::async_trait;

use crate::domain::entities::{Member, Party};
use crate::domain::value_objects::PartyCode;

/// Error type for directory operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Already exists: {0}")]
    AlreadyExists(String),
}

/// Authority that knows which parties exist and who is in them.
///
/// Parties are keyed by their join code.
#[async_trait]
pub trait PartyDirectory: Send + Sync {
    /// Find party by join code
    async fn find_by_code(&self, code: &PartyCode) -> Result<Option<Party>, RepositoryError>;

    /// Save party (create or replace)
    async fn save(&self, party: &Party) -> Result<(), RepositoryError>;

    /// Append a member to the roster and return the updated party
    async fn add_member(&self, code: &PartyCode, member: &Member)
        -> Result<Party, RepositoryError>;

    /// Remove one member from the roster and return the updated party
    async fn remove_member(
        &self,
        code: &PartyCode,
        member_id: &str,
    ) -> Result<Party, RepositoryError>;

    /// Delete party
    async fn delete(&self, code: &PartyCode) -> Result<(), RepositoryError>;
}
