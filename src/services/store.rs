use crate::models::Profile;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors that can occur when reading or writing profiles
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse seed file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Source of participant profiles for the daily run
///
/// The matching engine never talks to the store; the daily pipeline reads
/// from it and hands the engine a snapshot.
#[allow(async_fn_in_trait)]
pub trait ProfileStore {
    /// Profiles that opted in to pair tomorrow
    async fn pairing_profiles(&self) -> Result<Vec<Profile>, StoreError>;

    /// Profiles due a solo question on `weekday` (`mon`..`sun`)
    async fn solo_profiles(&self, weekday: &str) -> Result<Vec<Profile>, StoreError>;

    /// Profiles that asked to skip
    async fn skipping_profiles(&self) -> Result<Vec<Profile>, StoreError>;

    async fn get(&self, id: &str) -> Result<Profile, StoreError>;

    async fn upsert(&self, profile: Profile) -> Result<(), StoreError>;

    async fn set_skipping(&self, id: &str, skipping: bool) -> Result<(), StoreError>;
}

/// Profile store kept in process memory
///
/// Optionally seeded from a JSON array of profiles at startup.
#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    profiles: RwLock<BTreeMap<String, Profile>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profiles(profiles: impl IntoIterator<Item = Profile>) -> Self {
        let profiles = profiles
            .into_iter()
            .map(|profile| (profile.id.clone(), profile))
            .collect();

        Self {
            profiles: RwLock::new(profiles),
        }
    }

    /// Load a store from a JSON file containing an array of profiles
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let raw = tokio::fs::read_to_string(path.as_ref()).await?;
        let profiles: Vec<Profile> = serde_json::from_str(&raw)?;

        tracing::info!(
            "Loaded {} profiles from {}",
            profiles.len(),
            path.as_ref().display()
        );

        Ok(Self::with_profiles(profiles))
    }

    pub async fn len(&self) -> usize {
        self.profiles.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.profiles.read().await.is_empty()
    }

    async fn select<F>(&self, predicate: F) -> Vec<Profile>
    where
        F: Fn(&Profile) -> bool,
    {
        self.profiles
            .read()
            .await
            .values()
            .filter(|profile| predicate(*profile))
            .cloned()
            .collect()
    }
}

impl ProfileStore for InMemoryProfileStore {
    async fn pairing_profiles(&self) -> Result<Vec<Profile>, StoreError> {
        Ok(self.select(|p| p.is_pairing_tomorrow).await)
    }

    async fn solo_profiles(&self, weekday: &str) -> Result<Vec<Profile>, StoreError> {
        Ok(self.select(|p| p.is_solo_on(weekday)).await)
    }

    async fn skipping_profiles(&self) -> Result<Vec<Profile>, StoreError> {
        Ok(self.select(|p| p.is_skipping_tomorrow).await)
    }

    async fn get(&self, id: &str) -> Result<Profile, StoreError> {
        self.profiles
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("Profile not found for user {}", id)))
    }

    async fn upsert(&self, profile: Profile) -> Result<(), StoreError> {
        if profile.id.is_empty() {
            return Err(StoreError::InvalidInput("profile id must not be empty".into()));
        }

        tracing::debug!("Storing profile {}", profile.id);
        self.profiles.write().await.insert(profile.id.clone(), profile);
        Ok(())
    }

    async fn set_skipping(&self, id: &str, skipping: bool) -> Result<(), StoreError> {
        let mut profiles = self.profiles.write().await;
        let profile = profiles
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(format!("Profile not found for user {}", id)))?;
        profile.is_skipping_tomorrow = skipping;
        Ok(())
    }
}
