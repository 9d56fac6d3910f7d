//! The self-service profile page: form state, debounced validation, drafts and
//! save, wired together for one signed-in user.

use crate::domain::model::User;
use crate::domain::ports::{HrBackend, Storage};
use crate::domain::profile::{EducationEntry, FamilyMember, FieldPath, ProfileForm, Section};
use crate::form::debounce::{Debouncer, DEFAULT_DEBOUNCE};
use crate::form::draft::{
    AutoSaver, DraftOffer, DraftStore, DEFAULT_AUTOSAVE_SECONDS, DEFAULT_DRAFT_MAX_AGE_HOURS,
};
use crate::form::lists::DynamicList;
use crate::form::state::FormState;
use crate::form::validation::{validate_for_submit, validate_realtime, ErrorMap};
use crate::utils::error::{HrmError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use tokio::time::Instant;

#[derive(Debug, Clone, Copy)]
pub struct ProfileSettings {
    pub autosave_interval: chrono::Duration,
    pub draft_max_age: chrono::Duration,
    pub validation_debounce: std::time::Duration,
}

impl Default for ProfileSettings {
    fn default() -> Self {
        Self {
            autosave_interval: chrono::Duration::seconds(DEFAULT_AUTOSAVE_SECONDS),
            draft_max_age: chrono::Duration::hours(DEFAULT_DRAFT_MAX_AGE_HOURS),
            validation_debounce: DEFAULT_DEBOUNCE,
        }
    }
}

pub struct ProfileSession<S: Storage> {
    user: User,
    state: FormState,
    drafts: DraftStore<S>,
    autosaver: AutoSaver,
    validation: Debouncer<()>,
    realtime_errors: ErrorMap,
}

impl<S: Storage> ProfileSession<S> {
    /// Loads the form from the user record and looks for a fresh draft. The
    /// draft is only offered; nothing changes until `restore_draft`.
    pub async fn open(
        user: User,
        storage: S,
        server_updated_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
        settings: ProfileSettings,
    ) -> Result<(Self, Option<DraftOffer>)> {
        let drafts = DraftStore::with_max_age(storage, settings.draft_max_age);
        let offer = drafts
            .load(&user.id, now)
            .await?
            .map(|draft| DraftOffer::new(draft, server_updated_at.or(user.updated_at)));

        if let Some(offer) = &offer {
            tracing::info!(
                "📝 found draft for {} (conflicts with server: {})",
                user.id,
                offer.conflicts_with_server
            );
        }

        let session = Self {
            state: FormState::new(ProfileForm::from_user(&user)),
            user,
            drafts,
            autosaver: AutoSaver::new(settings.autosave_interval, now),
            validation: Debouncer::new(settings.validation_debounce),
            realtime_errors: ErrorMap::new(),
        };
        Ok((session, offer))
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn form(&self) -> &ProfileForm {
        self.state.form()
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// Errors from the last submit attempt, cleared field by field as the user edits.
    pub fn errors(&self) -> &ErrorMap {
        self.state.errors()
    }

    /// Result of the latest debounced realtime pass.
    pub fn realtime_errors(&self) -> &ErrorMap {
        &self.realtime_errors
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.state.has_unsaved_changes()
    }

    /// Leaving the page should ask for confirmation.
    pub fn before_unload_warning(&self) -> bool {
        self.state.has_unsaved_changes()
    }

    pub fn last_autosaved(&self) -> Option<DateTime<Utc>> {
        self.autosaver.last_saved()
    }

    pub fn restore_draft(&mut self, offer: DraftOffer) {
        self.state.replace(offer.draft.data);
        self.state.mark_unsaved();
    }

    pub fn change(&mut self, path: FieldPath, value: &str, now: Instant) -> Result<()> {
        self.state.handle_change(path, value)?;
        self.validation.push((), now);
        Ok(())
    }

    pub fn nested_change(
        &mut self,
        section: Section,
        field: &str,
        value: &str,
        now: Instant,
    ) -> Result<()> {
        self.state.handle_nested_change(section, field, value)?;
        self.validation.push((), now);
        Ok(())
    }

    pub fn set_bs_date(
        &mut self,
        path: FieldPath,
        value: &str,
        today: NaiveDate,
        now: Instant,
    ) -> Result<()> {
        self.state.set_bs_date(path, value, today)?;
        self.validation.push((), now);
        Ok(())
    }

    pub fn set_profile_image(
        &mut self,
        mime_type: &str,
        size: u64,
        data: String,
        now: Instant,
    ) -> Result<()> {
        self.state.set_profile_image(mime_type, size, data)?;
        self.validation.push((), now);
        Ok(())
    }

    pub fn copy_current_to_permanent_address(&mut self, now: Instant) {
        self.state.copy_current_to_permanent_address();
        self.validation.push((), now);
    }

    pub fn edit_family<R>(
        &mut self,
        now: Instant,
        edit: impl FnOnce(&mut DynamicList<'_, FamilyMember>) -> R,
    ) -> R {
        let result = edit(&mut self.state.family());
        self.validation.push((), now);
        result
    }

    pub fn edit_education<R>(
        &mut self,
        now: Instant,
        edit: impl FnOnce(&mut DynamicList<'_, EducationEntry>) -> R,
    ) -> R {
        let result = edit(&mut self.state.education());
        self.validation.push((), now);
        result
    }

    /// Runs realtime validation once edits have paused. Returns whether the
    /// error map was refreshed.
    pub fn poll_validation(&mut self, now: Instant) -> bool {
        if self.validation.poll(now).is_none() {
            return false;
        }
        self.realtime_errors = validate_realtime(self.state.form());
        if !self.realtime_errors.is_empty() {
            tracing::debug!("{}", self.realtime_errors.summary());
        }
        true
    }

    /// Drives the periodic draft save.
    pub async fn autosave(&mut self, now: DateTime<Utc>) -> Result<bool> {
        self.autosaver
            .tick(now, &self.user.id, &self.state, &self.drafts)
            .await
    }

    /// Validates everything and saves through the backend. On validation
    /// failure the field errors are kept on the form and returned.
    pub async fn submit<B>(&mut self, backend: &B) -> Result<User>
    where
        B: HrBackend + ?Sized,
    {
        let errors = validate_for_submit(self.state.form());
        if !errors.is_empty() {
            tracing::warn!("❌ profile save blocked: {}", errors.summary());
            self.state.set_errors(errors.clone());
            return Err(HrmError::FormValidation {
                errors: errors.into_map(),
            });
        }

        let updated = backend
            .update_profile(&self.user, &self.user.id, self.state.form().details())
            .await?;

        self.state.mark_saved();
        self.realtime_errors.clear();
        self.user = updated.clone();
        tracing::info!("✅ profile saved for {}", self.user.id);

        // the save already went through; a stale draft is only offered again later
        if let Err(e) = self.drafts.discard(&self.user.id).await {
            tracing::warn!("⚠️ could not remove draft for {}: {}", self.user.id, e);
        }
        Ok(updated)
    }

    /// Throws away local edits and the stored draft.
    pub async fn discard_changes(&mut self) -> Result<()> {
        self.state = FormState::new(ProfileForm::from_user(&self.user));
        self.realtime_errors.clear();
        self.drafts.discard(&self.user.id).await?;
        tracing::info!("↩️ discarded profile changes for {}", self.user.id);
        Ok(())
    }
}
