use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::entities::{Member, Party};
use crate::domain::repositories::{PartyDirectory, RepositoryError};

/// Leave party input
pub struct LeavePartyInput {
    pub party: Party,
    pub member: Member,
}

/// Leave party output
#[derive(Debug, PartialEq, Eq)]
pub struct LeavePartyOutput {
    pub party_deleted: bool,
}

/// Leave party use case.
///
/// A guest leaving only drops off the roster. The host leaving, or the last
/// member leaving, tears the party down.
pub struct LeaveParty<P: PartyDirectory + ?Sized> {
    directory: Arc<P>,
}

impl<P: PartyDirectory + ?Sized> LeaveParty<P> {
    pub fn new(directory: Arc<P>) -> Self {
        Self { directory }
    }

    pub async fn execute(&self, input: LeavePartyInput) -> Result<LeavePartyOutput, LeavePartyError> {
        let code = &input.party.code;
        let is_host = input.member.is_host || input.member.id == input.party.host_id;

        if is_host {
            return self.delete(&input.party).await;
        }

        let remaining = match self.directory.remove_member(code, &input.member.id).await {
            Ok(party) => party,
            Err(RepositoryError::NotFound(what)) => {
                debug!("Nothing to leave in {}: {} already gone", code, what);
                return Ok(LeavePartyOutput {
                    party_deleted: false,
                });
            }
            Err(e) => return Err(e.into()),
        };

        if remaining.members.is_empty() {
            return self.delete(&input.party).await;
        }

        info!("{} left party {}", input.member.name, code);
        Ok(LeavePartyOutput {
            party_deleted: false,
        })
    }

    async fn delete(&self, party: &Party) -> Result<LeavePartyOutput, LeavePartyError> {
        match self.directory.delete(&party.code).await {
            Ok(()) => info!("Party {} closed", party.code),
            Err(RepositoryError::NotFound(_)) => debug!("Party {} already closed", party.code),
            Err(e) => return Err(e.into()),
        }
        Ok(LeavePartyOutput {
            party_deleted: true,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LeavePartyError {
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}
