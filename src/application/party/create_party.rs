use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio::sync::Mutex;
use tracing::info;

use crate::domain::entities::{Member, Party};
use crate::domain::repositories::{PartyDirectory, RepositoryError};
use crate::domain::value_objects::PartyCode;

/// Create party input
pub struct CreatePartyInput {
    pub title: String,
    pub host_name: String,
    pub city: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
}

impl CreatePartyInput {
    pub fn new(title: impl Into<String>, host_name: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            host_name: host_name.into(),
            city: None,
            date: None,
            time: None,
        }
    }

    pub fn with_schedule(
        mut self,
        city: Option<String>,
        date: Option<String>,
        time: Option<String>,
    ) -> Self {
        self.city = city;
        self.date = date;
        self.time = time;
        self
    }
}

/// Create party output
pub struct CreatePartyOutput {
    pub party: Party,
    pub host: Member,
}

/// Create party use case.
///
/// Codes are drawn without checking for collisions; the 36^6 space is
/// plenty for a handful of local parties.
pub struct CreateParty<P: PartyDirectory + ?Sized> {
    directory: Arc<P>,
    rng: Mutex<ChaCha8Rng>,
}

impl<P: PartyDirectory + ?Sized> CreateParty<P> {
    pub fn new(directory: Arc<P>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            directory,
            rng: Mutex::new(rng),
        }
    }

    pub async fn execute(
        &self,
        input: CreatePartyInput,
    ) -> Result<CreatePartyOutput, CreatePartyError> {
        let code = {
            let mut rng = self.rng.lock().await;
            PartyCode::generate(&mut *rng)
        };

        let host = Member::new_host(&input.host_name);
        let party = Party::new(code, input.title, host.clone()).with_schedule(
            input.city,
            input.date,
            input.time,
        );

        self.directory.save(&party).await?;

        info!("Party created: {} ({})", party.code, party.title);
        Ok(CreatePartyOutput { party, host })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CreatePartyError {
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::directory::InMemoryPartyDirectory;

    #[tokio::test]
    async fn test_create_party_publishes_to_directory() {
        let directory = Arc::new(InMemoryPartyDirectory::new());
        let create = CreateParty::new(directory.clone(), Some(1));

        let input = CreatePartyInput::new("Beach Bash", "Ana").with_schedule(
            Some("Goa".into()),
            Some("2026-12-31".into()),
            Some("21:00".into()),
        );
        let output = create.execute(input).await.unwrap();

        assert!(output.host.is_host);
        assert_eq!(output.party.host_id, output.host.id);
        assert_eq!(output.party.members, vec![output.host.clone()]);
        assert_eq!(output.party.city.as_deref(), Some("Goa"));

        let stored = directory.find_by_code(&output.party.code).await.unwrap();
        assert_eq!(stored, Some(output.party));
    }

    #[tokio::test]
    async fn test_seeded_codes_repeat() {
        let first = CreateParty::new(Arc::new(InMemoryPartyDirectory::new()), Some(9));
        let second = CreateParty::new(Arc::new(InMemoryPartyDirectory::new()), Some(9));

        let a = first.execute(CreatePartyInput::new("A", "Ana")).await.unwrap();
        let b = second.execute(CreatePartyInput::new("B", "Ben")).await.unwrap();
        assert_eq!(a.party.code, b.party.code);
    }
}
