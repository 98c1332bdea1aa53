use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::entities::{Member, Party};
use crate::domain::repositories::{PartyDirectory, RepositoryError};
use crate::domain::value_objects::PartyCode;

/// Process-local party directory.
///
/// Stands in for a remote party service: parties live as long as the
/// directory does.
pub struct InMemoryPartyDirectory {
    parties: RwLock<HashMap<PartyCode, Party>>,
}

impl InMemoryPartyDirectory {
    pub fn new() -> Self {
        Self {
            parties: RwLock::new(HashMap::new()),
        }
    }

    /// Count parties currently registered
    pub async fn count(&self) -> usize {
        self.parties.read().await.len()
    }
}

impl Default for InMemoryPartyDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PartyDirectory for InMemoryPartyDirectory {
    async fn find_by_code(&self, code: &PartyCode) -> Result<Option<Party>, RepositoryError> {
        let parties = self.parties.read().await;
        Ok(parties.get(code).cloned())
    }

    async fn save(&self, party: &Party) -> Result<(), RepositoryError> {
        let mut parties = self.parties.write().await;
        parties.insert(party.code.clone(), party.clone());
        Ok(())
    }

    async fn add_member(
        &self,
        code: &PartyCode,
        member: &Member,
    ) -> Result<Party, RepositoryError> {
        let mut parties = self.parties.write().await;
        let party = parties
            .get_mut(code)
            .ok_or_else(|| RepositoryError::NotFound(format!("party {}", code)))?;

        if !party.add_member(member.clone()) {
            return Err(RepositoryError::AlreadyExists(format!("member {}", member.id)));
        }
        Ok(party.clone())
    }

    async fn remove_member(
        &self,
        code: &PartyCode,
        member_id: &str,
    ) -> Result<Party, RepositoryError> {
        let mut parties = self.parties.write().await;
        let party = parties
            .get_mut(code)
            .ok_or_else(|| RepositoryError::NotFound(format!("party {}", code)))?;

        party
            .remove_member(member_id)
            .ok_or_else(|| RepositoryError::NotFound(format!("member {}", member_id)))?;
        Ok(party.clone())
    }

    async fn delete(&self, code: &PartyCode) -> Result<(), RepositoryError> {
        let mut parties = self.parties.write().await;
        parties
            .remove(code)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::NotFound(format!("party {}", code)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn party() -> Party {
        Party::new(
            PartyCode::parse("ROOM42").unwrap(),
            "Rooftop".into(),
            Member::new_host("Ana"),
        )
    }

    #[tokio::test]
    async fn test_save_and_find() {
        let directory = InMemoryPartyDirectory::new();
        let party = party();
        directory.save(&party).await.unwrap();

        let found = directory.find_by_code(&party.code).await.unwrap();
        assert_eq!(found, Some(party));

        let other = PartyCode::parse("ZZZZZZ").unwrap();
        assert!(directory.find_by_code(&other).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_member_roster() {
        let directory = InMemoryPartyDirectory::new();
        let party = party();
        directory.save(&party).await.unwrap();

        let guest = Member::new_guest("Ben");
        let updated = directory.add_member(&party.code, &guest).await.unwrap();
        assert_eq!(updated.member_count(), 2);

        let duplicate = directory.add_member(&party.code, &guest).await;
        assert!(matches!(duplicate, Err(RepositoryError::AlreadyExists(_))));

        let updated = directory.remove_member(&party.code, &guest.id).await.unwrap();
        assert_eq!(updated.member_count(), 1);

        let missing = directory.remove_member(&party.code, &guest.id).await;
        assert!(matches!(missing, Err(RepositoryError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete() {
        let directory = InMemoryPartyDirectory::new();
        let party = party();
        directory.save(&party).await.unwrap();
        assert_eq!(directory.count().await, 1);

        directory.delete(&party.code).await.unwrap();
        assert_eq!(directory.count().await, 0);
        assert!(matches!(
            directory.delete(&party.code).await,
            Err(RepositoryError::NotFound(_))
        ));
    }
}
