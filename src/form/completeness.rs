//! Completeness scoring shown as the profile badge and the progress card.

use crate::domain::profile::{IdentificationField, ProfileForm};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CompletenessStatus {
    Complete,
    AlmostDone,
    InProgress,
    JustStarted,
}

impl CompletenessStatus {
    pub fn from_percentage(percentage: u32) -> Self {
        match percentage {
            100.. => CompletenessStatus::Complete,
            75..=99 => CompletenessStatus::AlmostDone,
            50..=74 => CompletenessStatus::InProgress,
            _ => CompletenessStatus::JustStarted,
        }
    }
}

impl fmt::Display for CompletenessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CompletenessStatus::Complete => "Complete",
            CompletenessStatus::AlmostDone => "Almost Done",
            CompletenessStatus::InProgress => "In Progress",
            CompletenessStatus::JustStarted => "Just Started",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Completeness {
    pub completed: u32,
    pub total: u32,
    pub percentage: u32,
}

impl Completeness {
    fn from_checks(checks: &[bool]) -> Self {
        let total = checks.len() as u32;
        let completed = checks.iter().filter(|done| **done).count() as u32;
        Self {
            completed,
            total,
            percentage: percentage(completed, total),
        }
    }

    pub fn status(&self) -> CompletenessStatus {
        CompletenessStatus::from_percentage(self.percentage)
    }
}

/// Rounded half up.
fn percentage(completed: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (completed * 100 + total / 2) / total
}

const BADGE_ID_FIELDS: [IdentificationField; 6] = [
    IdentificationField::CitizenshipNo,
    IdentificationField::PanNo,
    IdentificationField::NationalIdCardNo,
    IdentificationField::PassportNo,
    IdentificationField::AccountNo,
    IdentificationField::AccountHolderNameNepali,
];

const PROGRESS_ID_FIELDS: [IdentificationField; 4] = [
    IdentificationField::AccountHolderNameNepali,
    IdentificationField::CitizenshipNo,
    IdentificationField::CitizenshipIssuePlace,
    IdentificationField::PanNo,
];

/// Badge score over 15 points.
pub fn completeness(form: &ProfileForm) -> Completeness {
    let mut checks = vec![
        !form.profile_image.is_empty(),
        !form.religion.is_empty(),
        !form.nationality.is_empty(),
        !form.gender.is_empty(),
        !form.date_of_birth.is_empty(),
    ];
    checks.extend(
        BADGE_ID_FIELDS
            .iter()
            .map(|field| !form.identification.get(*field).is_empty()),
    );
    checks.extend([
        !form.family_members.is_empty(),
        !form.education.is_empty(),
        form.current_address.is_complete(),
        form.permanent_address.is_complete(),
    ]);
    Completeness::from_checks(&checks)
}

fn has_any_current_address(form: &ProfileForm) -> bool {
    let address = &form.current_address;
    !address.municipality.is_empty() || !address.district.is_empty() || !address.mobile.is_empty()
}

/// Progress card score over 10 points.
pub fn progress(form: &ProfileForm) -> Completeness {
    let mut checks = vec![!form.profile_image.is_empty()];
    checks.extend(
        PROGRESS_ID_FIELDS
            .iter()
            .map(|field| !form.identification.get(*field).is_empty()),
    );
    checks.extend([
        !form.family_members.is_empty(),
        !form.education.is_empty(),
        has_any_current_address(form),
        !form.religion.is_empty(),
        !form.nationality.is_empty(),
    ]);
    Completeness::from_checks(&checks)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionStatus {
    pub name: &'static str,
    pub completed: bool,
}

pub fn section_checklist(form: &ProfileForm) -> Vec<SectionStatus> {
    let identification_done = PROGRESS_ID_FIELDS
        .iter()
        .all(|field| !form.identification.get(*field).is_empty());

    vec![
        SectionStatus {
            name: "Profile Image",
            completed: !form.profile_image.is_empty(),
        },
        SectionStatus {
            name: "Identification",
            completed: identification_done,
        },
        SectionStatus {
            name: "Family Details",
            completed: !form.family_members.is_empty(),
        },
        SectionStatus {
            name: "Education",
            completed: !form.education.is_empty(),
        },
        SectionStatus {
            name: "Address",
            completed: has_any_current_address(form),
        },
    ]
}
