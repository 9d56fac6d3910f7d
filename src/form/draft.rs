//! Local drafts of unsaved profile edits.

use crate::domain::ports::Storage;
use crate::domain::profile::ProfileForm;
use crate::form::state::FormState;
use crate::utils::error::Result;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_AUTOSAVE_SECONDS: i64 = 30;
pub const DEFAULT_DRAFT_MAX_AGE_HOURS: i64 = 24;

pub fn draft_key(user_id: &str) -> String {
    format!("profile_draft_{}", user_id)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    pub data: ProfileForm,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl Draft {
    pub fn saved_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }

    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        Duration::milliseconds(now.timestamp_millis() - self.timestamp)
    }
}

/// A restorable draft found when the profile page opens.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftOffer {
    pub draft: Draft,
    /// The server copy changed after the draft was written.
    pub conflicts_with_server: bool,
}

impl DraftOffer {
    pub fn new(draft: Draft, server_updated_at: Option<DateTime<Utc>>) -> Self {
        let conflicts_with_server = match (server_updated_at, draft.saved_at()) {
            (Some(server), Some(saved)) => server > saved,
            _ => false,
        };
        Self {
            draft,
            conflicts_with_server,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DraftStore<S: Storage> {
    storage: S,
    max_age: Duration,
}

impl<S: Storage> DraftStore<S> {
    pub fn new(storage: S) -> Self {
        Self::with_max_age(storage, Duration::hours(DEFAULT_DRAFT_MAX_AGE_HOURS))
    }

    pub fn with_max_age(storage: S, max_age: Duration) -> Self {
        Self { storage, max_age }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub async fn save(&self, user_id: &str, form: &ProfileForm, now: DateTime<Utc>) -> Result<Draft> {
        let draft = Draft {
            data: form.clone(),
            timestamp: now.timestamp_millis(),
        };
        let bytes = serde_json::to_vec(&draft)?;
        self.storage.write(&draft_key(user_id), &bytes).await?;
        tracing::debug!("📝 draft saved for {}", user_id);
        Ok(draft)
    }

    /// The stored draft if it is still fresh. Stale or unreadable drafts are
    /// removed.
    pub async fn load(&self, user_id: &str, now: DateTime<Utc>) -> Result<Option<Draft>> {
        let key = draft_key(user_id);
        let Some(bytes) = self.storage.read(&key).await? else {
            return Ok(None);
        };

        let draft: Draft = match serde_json::from_slice(&bytes) {
            Ok(draft) => draft,
            Err(e) => {
                tracing::warn!("⚠️ discarding unreadable draft {}: {}", key, e);
                self.storage.remove(&key).await?;
                return Ok(None);
            }
        };

        if draft.age(now) >= self.max_age {
            tracing::info!("🗑️ draft {} expired", key);
            self.storage.remove(&key).await?;
            return Ok(None);
        }

        Ok(Some(draft))
    }

    pub async fn discard(&self, user_id: &str) -> Result<()> {
        self.storage.remove(&draft_key(user_id)).await
    }
}

/// Periodic draft writer: saves on each interval tick, but only when the form
/// has unsaved changes.
#[derive(Debug, Clone)]
pub struct AutoSaver {
    interval: Duration,
    next_due: DateTime<Utc>,
    last_saved: Option<DateTime<Utc>>,
}

impl AutoSaver {
    pub fn new(interval: Duration, started_at: DateTime<Utc>) -> Self {
        Self {
            interval,
            next_due: started_at + interval,
            last_saved: None,
        }
    }

    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        self.last_saved
    }

    pub fn next_due(&self) -> DateTime<Utc> {
        self.next_due
    }

    pub async fn tick<S: Storage>(
        &mut self,
        now: DateTime<Utc>,
        user_id: &str,
        state: &FormState,
        drafts: &DraftStore<S>,
    ) -> Result<bool> {
        if now < self.next_due {
            return Ok(false);
        }
        self.next_due = now + self.interval;

        if !state.has_unsaved_changes() {
            return Ok(false);
        }
        drafts.save(user_id, state.form(), now).await?;
        self.last_saved = Some(now);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryStorage;
    use crate::domain::profile::{FieldPath, ProfileField};
    use chrono::TimeZone;

    fn at(hour: u32, min: u32, sec: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 16, hour, min, sec).unwrap()
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let store = DraftStore::new(MemoryStorage::new());
        let mut form = ProfileForm::default();
        form.religion = "Hindu".to_string();

        store.save("EMP0001", &form, at(9, 0, 0)).await.unwrap();
        let raw = store.storage().read("profile_draft_EMP0001").await.unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_slice(&raw).unwrap();
        assert_eq!(json["data"]["religion"], "Hindu");
        assert_eq!(json["timestamp"], at(9, 0, 0).timestamp_millis());

        let draft = store.load("EMP0001", at(20, 0, 0)).await.unwrap().unwrap();
        assert_eq!(draft.data, form);
        assert_eq!(draft.saved_at(), Some(at(9, 0, 0)));
        assert!(store.load("EMP0002", at(20, 0, 0)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_and_corrupt_drafts_are_removed() {
        let storage = MemoryStorage::new();
        let store = DraftStore::new(storage.clone());

        store.save("EMP0001", &ProfileForm::default(), at(9, 0, 0)).await.unwrap();
        let next_day = at(9, 0, 0) + Duration::hours(24);
        assert!(store.load("EMP0001", next_day).await.unwrap().is_none());
        assert!(storage.keys().await.is_empty());

        storage.write("profile_draft_EMP0003", b"{not json").await.unwrap();
        assert!(store.load("EMP0003", at(9, 0, 0)).await.unwrap().is_none());
        assert!(storage.keys().await.is_empty());
    }

    #[test]
    fn test_offer_flags_newer_server_copy() {
        let draft = Draft {
            data: ProfileForm::default(),
            timestamp: at(9, 0, 0).timestamp_millis(),
        };
        assert!(DraftOffer::new(draft.clone(), Some(at(10, 0, 0))).conflicts_with_server);
        assert!(!DraftOffer::new(draft.clone(), Some(at(8, 0, 0))).conflicts_with_server);
        assert!(!DraftOffer::new(draft, None).conflicts_with_server);
    }

    #[tokio::test]
    async fn test_autosave_only_when_dirty_and_due() {
        let store = DraftStore::new(MemoryStorage::new());
        let mut state = FormState::new(ProfileForm::default());
        let mut saver = AutoSaver::new(Duration::seconds(DEFAULT_AUTOSAVE_SECONDS), at(9, 0, 0));

        assert!(!saver.tick(at(9, 0, 30), "EMP0001", &state, &store).await.unwrap());
        assert!(store.load("EMP0001", at(9, 0, 30)).await.unwrap().is_none());

        state
            .handle_change(FieldPath::Profile(ProfileField::Gender), "Male")
            .unwrap();
        assert!(!saver.tick(at(9, 0, 45), "EMP0001", &state, &store).await.unwrap());
        assert!(saver.tick(at(9, 1, 0), "EMP0001", &state, &store).await.unwrap());
        assert_eq!(saver.last_saved(), Some(at(9, 1, 0)));
        assert_eq!(saver.next_due(), at(9, 1, 30));

        let draft = store.load("EMP0001", at(9, 2, 0)).await.unwrap().unwrap();
        assert_eq!(draft.data.gender, "Male");
    }
}
