use crate::calendar::{age_on, BsDate};
use crate::domain::profile::{
    EducationEntry, FamilyMember, FieldPath, IdentificationField, ProfileField, ProfileForm,
    Section,
};
use crate::form::lists::DynamicList;
use crate::form::validation::ErrorMap;
use crate::utils::error::{HrmError, Result};
use chrono::NaiveDate;

pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

/// The form being edited, the values it was loaded with, and the errors
/// currently shown next to fields.
#[derive(Debug, Clone)]
pub struct FormState {
    form: ProfileForm,
    initial: ProfileForm,
    has_unsaved_changes: bool,
    errors: ErrorMap,
}

impl FormState {
    pub fn new(form: ProfileForm) -> Self {
        Self {
            initial: form.clone(),
            form,
            has_unsaved_changes: false,
            errors: ErrorMap::new(),
        }
    }

    pub fn form(&self) -> &ProfileForm {
        &self.form
    }

    pub fn initial(&self) -> &ProfileForm {
        &self.initial
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.has_unsaved_changes
    }

    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    pub fn set_errors(&mut self, errors: ErrorMap) {
        self.errors = errors;
    }

    pub fn handle_change(&mut self, path: FieldPath, value: impl Into<String>) -> Result<()> {
        if let FieldPath::Profile(field) = path {
            if field.is_read_only() {
                return Err(HrmError::ValidationError {
                    message: format!("{} is managed by HR and cannot be edited", field.key()),
                });
            }
            if field == ProfileField::ProfileImage {
                return self.change_profile_image(value.into());
            }
        }
        *self.form.get_mut(path) = value.into();
        self.touch(path);
        Ok(())
    }

    pub fn handle_nested_change(
        &mut self,
        section: Section,
        field: &str,
        value: impl Into<String>,
    ) -> Result<()> {
        let path = section.path(field)?;
        self.handle_change(path, value)
    }

    /// Sets a BS date field and fills its AD companion. Text that is not a real
    /// BS date is kept as typed and the AD side is left alone.
    pub fn set_bs_date(&mut self, path: FieldPath, value: &str, today: NaiveDate) -> Result<()> {
        let companion = match path {
            FieldPath::Profile(ProfileField::DobBs) => FieldPath::Profile(ProfileField::DateOfBirth),
            FieldPath::Identification(IdentificationField::CitizenshipIssueDateBs) => {
                FieldPath::Identification(IdentificationField::CitizenshipIssueDate)
            }
            FieldPath::Identification(IdentificationField::NationalIdCardIssueDateBs) => {
                FieldPath::Identification(IdentificationField::NationalIdCardIssueDate)
            }
            FieldPath::Identification(IdentificationField::DrivingLicenseIssueDateBs) => {
                FieldPath::Identification(IdentificationField::DrivingLicenseIssueDate)
            }
            other => {
                return Err(HrmError::ValidationError {
                    message: format!("{} is not a BS date field", other),
                })
            }
        };

        self.handle_change(path, value)?;

        let Ok(date) = value.trim().parse::<BsDate>() else {
            tracing::debug!("BS value '{}' for {} not converted", value, path);
            return Ok(());
        };
        *self.form.get_mut(companion) = date.to_ad().to_string();
        self.errors.remove(&companion.to_string());
        if path == FieldPath::Profile(ProfileField::DobBs) {
            self.form.age = age_on(date, today).to_string();
        }
        Ok(())
    }

    pub fn set_profile_image(&mut self, mime_type: &str, size: u64, data: String) -> Result<()> {
        if !mime_type.starts_with("image/") {
            return Err(HrmError::ValidationError {
                message: "Please upload a valid image file.".to_string(),
            });
        }
        if size > MAX_IMAGE_BYTES {
            return Err(HrmError::ValidationError {
                message: "Image size should be less than 5MB.".to_string(),
            });
        }
        self.form.profile_image = data;
        self.touch(FieldPath::Profile(ProfileField::ProfileImage));
        Ok(())
    }

    /// A typed image value must be a `data:` URL so it goes through the same
    /// type and size checks as an upload. An empty value removes the photo.
    fn change_profile_image(&mut self, value: String) -> Result<()> {
        if value.is_empty() {
            self.form.profile_image = value;
            self.touch(FieldPath::Profile(ProfileField::ProfileImage));
            return Ok(());
        }
        let Some((mime_type, size)) = parse_data_url(&value) else {
            return Err(HrmError::ValidationError {
                message: "Please upload a valid image file.".to_string(),
            });
        };
        let mime_type = mime_type.to_string();
        self.set_profile_image(&mime_type, size, value)
    }

    pub fn copy_current_to_permanent_address(&mut self) {
        self.form.permanent_address = self.form.current_address.clone();
        let stale: Vec<String> = self
            .errors
            .iter()
            .filter(|(key, _)| key.starts_with("permanentAddress."))
            .map(|(key, _)| key.to_string())
            .collect();
        for key in stale {
            self.errors.remove(&key);
        }
        self.has_unsaved_changes = true;
    }

    pub fn family(&mut self) -> DynamicList<'_, FamilyMember> {
        DynamicList::new(
            &mut self.form.family_members,
            &mut self.has_unsaved_changes,
            &mut self.errors,
        )
    }

    pub fn education(&mut self) -> DynamicList<'_, EducationEntry> {
        DynamicList::new(
            &mut self.form.education,
            &mut self.has_unsaved_changes,
            &mut self.errors,
        )
    }

    /// Back to the values the form was loaded with.
    pub fn reset(&mut self) {
        self.form = self.initial.clone();
        self.errors.clear();
        self.has_unsaved_changes = false;
    }

    /// Swaps the whole form without touching the dirty flag.
    pub fn replace(&mut self, form: ProfileForm) {
        self.form = form;
    }

    pub fn mark_unsaved(&mut self) {
        self.has_unsaved_changes = true;
    }

    /// The current values become the new baseline.
    pub fn mark_saved(&mut self) {
        self.initial = self.form.clone();
        self.has_unsaved_changes = false;
    }

    fn touch(&mut self, path: FieldPath) {
        self.has_unsaved_changes = true;
        self.errors.remove(&path.to_string());
    }
}

/// MIME type and decoded byte size of a base64 `data:` URL.
fn parse_data_url(value: &str) -> Option<(&str, u64)> {
    let rest = value.strip_prefix("data:")?;
    let (mime_type, payload) = rest.split_once(";base64,")?;
    let payload = payload.trim_end_matches('=');
    Some((mime_type, payload.len() as u64 * 3 / 4))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::profile::{AddressField, FamilyMemberField};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 16).unwrap()
    }

    #[test]
    fn test_change_marks_dirty_and_clears_error() {
        let mut state = FormState::new(ProfileForm::default());
        let mut errors = ErrorMap::new();
        errors.insert("religion", "stale");
        errors.insert("currentAddress.mobile", "Mobile must be 10 digits");
        state.set_errors(errors);

        state
            .handle_change("religion".parse().unwrap(), "Buddhist")
            .unwrap();
        state
            .handle_nested_change(Section::CurrentAddress, "mobile", "9812345678")
            .unwrap();

        assert!(state.has_unsaved_changes());
        assert!(state.errors().is_empty());
        assert_eq!(state.form().religion, "Buddhist");
        assert_eq!(state.form().current_address.mobile, "9812345678");
        assert!(state
            .handle_nested_change(Section::CurrentAddress, "planet", "Mars")
            .is_err());
    }

    #[test]
    fn test_read_only_fields_are_rejected() {
        let mut state = FormState::new(ProfileForm::default());
        let err = state
            .handle_change(FieldPath::Profile(ProfileField::Email), "x@y.z")
            .unwrap_err();
        assert!(matches!(err, HrmError::ValidationError { .. }));
        assert!(!state.has_unsaved_changes());
    }

    #[test]
    fn test_bs_date_fills_ad_companion() {
        let mut state = FormState::new(ProfileForm::default());
        state
            .set_bs_date(FieldPath::Profile(ProfileField::DobBs), "2050-06-10", today())
            .unwrap();
        assert_eq!(state.form().date_of_birth, "1993-09-26");
        assert_eq!(state.form().age, "32");

        let issue = FieldPath::Identification(IdentificationField::CitizenshipIssueDateBs);
        state.set_bs_date(issue, "2081-09-15", today()).unwrap();
        assert_eq!(state.form().identification.citizenship_issue_date, "2024-12-30");

        state.set_bs_date(issue, "2081-09-3", today()).unwrap();
        assert_eq!(state.form().identification.citizenship_issue_date_bs, "2081-09-3");
        assert_eq!(state.form().identification.citizenship_issue_date, "2024-12-30");

        assert!(state
            .set_bs_date(FieldPath::Profile(ProfileField::Religion), "2050-01-01", today())
            .is_err());
    }

    #[test]
    fn test_profile_image_limits() {
        let mut state = FormState::new(ProfileForm::default());
        assert!(state
            .set_profile_image("application/pdf", 10, "data:application/pdf;base64,AA".into())
            .is_err());
        assert!(state
            .set_profile_image("image/png", MAX_IMAGE_BYTES + 1, "data:image/png;base64,AA".into())
            .is_err());
        assert!(!state.has_unsaved_changes());
        state
            .set_profile_image("image/png", 1024, "data:image/png;base64,AA".into())
            .unwrap();
        assert_eq!(state.form().profile_image, "data:image/png;base64,AA");
        assert!(state.has_unsaved_changes());
    }

    #[test]
    fn test_typed_profile_image_gets_upload_checks() {
        let image = FieldPath::Profile(ProfileField::ProfileImage);
        let mut state = FormState::new(ProfileForm::default());

        for bad in [
            "data:application/pdf;base64,JVBERi0=",
            "https://example.com/me.png",
            "not an image",
        ] {
            let err = state.handle_change(image, bad).unwrap_err();
            assert!(matches!(err, HrmError::ValidationError { .. }), "{}", bad);
        }
        let oversized = format!("data:image/jpeg;base64,{}", "A".repeat(7 * 1024 * 1024));
        assert!(state.handle_change(image, oversized).is_err());
        assert!(!state.has_unsaved_changes());
        assert_eq!(state.form().profile_image, "");

        state.handle_change(image, "data:image/png;base64,iVBORw0KGgo=").unwrap();
        assert_eq!(state.form().profile_image, "data:image/png;base64,iVBORw0KGgo=");
        assert!(state.has_unsaved_changes());

        // clearing the photo needs no checks
        state.handle_change(image, "").unwrap();
        assert_eq!(state.form().profile_image, "");
    }

    #[test]
    fn test_copy_address_and_reset() {
        let mut form = ProfileForm::default();
        form.current_address.district = "Lalitpur".to_string();
        let mut state = FormState::new(form);

        state
            .handle_change(FieldPath::CurrentAddress(AddressField::WardNo), "5")
            .unwrap();
        state.copy_current_to_permanent_address();
        assert_eq!(state.form().permanent_address.district, "Lalitpur");

        let id = state.family().add();
        state.family().update(&id, FamilyMemberField::Name, "Gita");
        assert_eq!(state.form().family_members.len(), 1);

        state.reset();
        assert!(!state.has_unsaved_changes());
        assert_eq!(state.form().permanent_address.district, "");
        assert!(state.form().family_members.is_empty());
    }

    #[test]
    fn test_mark_saved_moves_baseline() {
        let mut state = FormState::new(ProfileForm::default());
        state
            .handle_change(FieldPath::Profile(ProfileField::Nationality), "Nepali")
            .unwrap();
        state.mark_saved();
        assert!(!state.has_unsaved_changes());
        assert_eq!(state.initial().nationality, "Nepali");

        let mut other = ProfileForm::default();
        other.gender = "Female".to_string();
        state.replace(other);
        assert!(!state.has_unsaved_changes());
        state.reset();
        assert_eq!(state.form().nationality, "Nepali");
    }
}
