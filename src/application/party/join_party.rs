use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::entities::{Member, Party};
use crate::domain::repositories::{PartyDirectory, RepositoryError};
use crate::domain::value_objects::{PartyCode, PartyCodeError};

/// What a join does when the directory has no party for the code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinMode {
    /// Fail with `PartyNotFound`
    Directory,
    /// Fabricate a placeholder party so the app stays usable offline
    Demo,
}

impl JoinMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            JoinMode::Directory => "directory",
            JoinMode::Demo => "demo",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "directory" => Some(JoinMode::Directory),
            "demo" => Some(JoinMode::Demo),
            _ => None,
        }
    }
}

/// Title and host shown on fabricated demo parties
#[derive(Debug, Clone)]
pub struct DemoPartyTemplate {
    pub title: String,
    pub host_name: String,
}

/// Join party input
pub struct JoinPartyInput {
    /// Raw code as typed by the guest
    pub code: String,
    pub user_name: String,
}

/// Join party output
pub struct JoinPartyOutput {
    pub party: Party,
    pub member: Member,
    pub fabricated: bool,
}

/// Join party use case
pub struct JoinParty<P: PartyDirectory + ?Sized> {
    directory: Arc<P>,
    mode: JoinMode,
    demo: DemoPartyTemplate,
}

impl<P: PartyDirectory + ?Sized> JoinParty<P> {
    pub fn new(directory: Arc<P>, mode: JoinMode, demo: DemoPartyTemplate) -> Self {
        Self {
            directory,
            mode,
            demo,
        }
    }

    pub async fn execute(&self, input: JoinPartyInput) -> Result<JoinPartyOutput, JoinPartyError> {
        let code = PartyCode::parse(&input.code)?;
        let member = Member::new_guest(&input.user_name);

        if self.directory.find_by_code(&code).await?.is_some() {
            let party = self.directory.add_member(&code, &member).await?;
            info!("Joined party: {} as {}", code, member.name);
            return Ok(JoinPartyOutput {
                party,
                member,
                fabricated: false,
            });
        }

        match self.mode {
            JoinMode::Directory => Err(JoinPartyError::PartyNotFound(code)),
            JoinMode::Demo => {
                warn!("Creating demo party for code: {}", code);
                let party = Party::demo(
                    code,
                    self.demo.title.clone(),
                    self.demo.host_name.clone(),
                    member.clone(),
                );
                self.directory.save(&party).await?;
                Ok(JoinPartyOutput {
                    party,
                    member,
                    fabricated: true,
                })
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JoinPartyError {
    #[error("Invalid party code: {0}")]
    InvalidCode(#[from] PartyCodeError),
    #[error("Party not found: {0}")]
    PartyNotFound(PartyCode),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}
