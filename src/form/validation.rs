//! Rule-based field validation producing a keyed error map.

use crate::calendar::BsDate;
use crate::domain::profile::{Address, FieldPath, IdentificationField, ProfileField, ProfileForm};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap())
}

fn mobile_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{10}$").unwrap())
}

fn pan_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{9}$").unwrap())
}

pub fn is_valid_email(value: &str) -> bool {
    email_regex().is_match(value)
}

pub fn is_valid_mobile(value: &str) -> bool {
    mobile_regex().is_match(value)
}

#[derive(Debug, Clone, Default)]
pub struct FieldRules {
    pub required: bool,
    pub email: bool,
    pub mobile: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<Regex>,
    pub pattern_message: Option<String>,
}

impl FieldRules {
    pub fn required() -> Self {
        Self {
            required: true,
            ..Self::default()
        }
    }

    pub fn email() -> Self {
        Self {
            email: true,
            ..Self::default()
        }
    }

    pub fn mobile() -> Self {
        Self {
            mobile: true,
            ..Self::default()
        }
    }

    pub fn min_length(n: usize) -> Self {
        Self {
            min_length: Some(n),
            ..Self::default()
        }
    }

    pub fn pattern(pattern: Regex, message: impl Into<String>) -> Self {
        Self {
            pattern: Some(pattern),
            pattern_message: Some(message.into()),
            ..Self::default()
        }
    }
}

/// Every rule that fails, in rule order. Only `required` looks at empty values.
pub fn validate_field(label: &str, value: &str, rules: &FieldRules) -> Vec<String> {
    let mut errors = Vec::new();

    if rules.required && value.is_empty() {
        errors.push(format!("{} is required", label));
    }
    if value.is_empty() {
        return errors;
    }

    if rules.email && !is_valid_email(value) {
        errors.push("Invalid email format".to_string());
    }
    if rules.mobile && !is_valid_mobile(value) {
        errors.push("Mobile number must be 10 digits".to_string());
    }

    let len = value.chars().count();
    if let Some(min) = rules.min_length {
        if len < min {
            errors.push(format!("Minimum {} characters required", min));
        }
    }
    if let Some(max) = rules.max_length {
        if len > max {
            errors.push(format!("Maximum {} characters allowed", max));
        }
    }
    if let Some(pattern) = &rules.pattern {
        if !pattern.is_match(value) {
            errors.push(
                rules
                    .pattern_message
                    .clone()
                    .unwrap_or_else(|| "Invalid format".to_string()),
            );
        }
    }

    errors
}

/// Field key to message, in the order fields appear on the page. The first
/// message recorded for a key wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorMap {
    entries: Vec<(String, String)>,
}

impl ErrorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, message: impl Into<String>) {
        let key = key.into();
        if !self.contains(&key) {
            self.entries.push((key, message.into()));
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, m)| m.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, m)| (k.as_str(), m.as_str()))
    }

    /// Field to focus after a failed submit.
    pub fn first_key(&self) -> Option<&str> {
        self.entries.first().map(|(k, _)| k.as_str())
    }

    pub fn summary(&self) -> String {
        let n = self.len();
        format!(
            "{} validation error{} found",
            n,
            if n == 1 { "" } else { "s" }
        )
    }

    pub fn into_map(self) -> BTreeMap<String, String> {
        self.entries.into_iter().collect()
    }
}

const BS_DATE_FIELDS: [FieldPath; 4] = [
    FieldPath::Profile(ProfileField::DobBs),
    FieldPath::Identification(IdentificationField::CitizenshipIssueDateBs),
    FieldPath::Identification(IdentificationField::NationalIdCardIssueDateBs),
    FieldPath::Identification(IdentificationField::DrivingLicenseIssueDateBs),
];

const REQUIRED_IDENTIFICATION: [(IdentificationField, &str); 4] = [
    (
        IdentificationField::AccountHolderNameNepali,
        "Nepali name is required",
    ),
    (
        IdentificationField::CitizenshipNo,
        "Citizenship number is required",
    ),
    (
        IdentificationField::CitizenshipIssuePlace,
        "Issue place is required",
    ),
    (IdentificationField::PanNo, "PAN number is required"),
];

/// Checks run while the user types: format rules on whatever is filled in.
pub fn validate_realtime(form: &ProfileForm) -> ErrorMap {
    let mut errors = ErrorMap::new();
    check_personal(form, &mut errors);
    check_identification(form, false, &mut errors);
    check_address("currentAddress", &form.current_address, &mut errors);
    check_address("permanentAddress", &form.permanent_address, &mut errors);
    errors
}

/// Checks run on save: the realtime rules plus required fields and list entries.
pub fn validate_for_submit(form: &ProfileForm) -> ErrorMap {
    let mut errors = ErrorMap::new();
    check_personal(form, &mut errors);
    check_identification(form, true, &mut errors);

    for (i, member) in form.family_members.iter().enumerate() {
        if member.relationship.trim().is_empty() {
            errors.insert(
                format!("familyMember.{}.relationship", i),
                "Relationship is required",
            );
        }
        if member.name.trim().is_empty() {
            errors.insert(format!("familyMember.{}.name", i), "Name is required");
        }
    }

    for (i, entry) in form.education.iter().enumerate() {
        if entry.degree.trim().is_empty() {
            errors.insert(format!("education.{}.degree", i), "Degree is required");
        }
        if entry.institute.trim().is_empty() {
            errors.insert(format!("education.{}.institute", i), "Institute is required");
        }
    }

    check_address("currentAddress", &form.current_address, &mut errors);
    check_address("permanentAddress", &form.permanent_address, &mut errors);
    errors
}

fn check_personal(form: &ProfileForm, errors: &mut ErrorMap) {
    if let Some(message) = validate_field("Email", &form.email, &FieldRules::email()).pop() {
        errors.insert("email", message);
    }
    if let Some(message) = validate_field("Phone", &form.phone, &FieldRules::mobile()).pop() {
        errors.insert("phone", message);
    }
    check_bs_date(form, BS_DATE_FIELDS[0], errors);
}

fn check_bs_date(form: &ProfileForm, path: FieldPath, errors: &mut ErrorMap) {
    let value = form.get(path).trim();
    if !value.is_empty() && value.parse::<BsDate>().is_err() {
        errors.insert(path.to_string(), "Enter a valid BS date (YYYY-MM-DD)");
    }
}

fn check_identification(form: &ProfileForm, submit: bool, errors: &mut ErrorMap) {
    let identification = &form.identification;

    for (field, message) in REQUIRED_IDENTIFICATION {
        let value = identification.get(field);
        // while typing, only whitespace-only input counts as missing
        let missing = if submit {
            value.trim().is_empty()
        } else {
            !value.is_empty() && value.trim().is_empty()
        };
        if missing {
            errors.insert(FieldPath::Identification(field).to_string(), message);
        }
    }

    let citizenship = &identification.citizenship_no;
    if let Some(message) =
        validate_field("Citizenship Number", citizenship, &FieldRules::min_length(5))
            .into_iter()
            .next()
    {
        errors.insert("identification.citizenshipNo", message);
    }

    let pan_rules = FieldRules::pattern(pan_regex().clone(), "PAN must be 9 digits");
    if let Some(message) = validate_field("PAN Number", &identification.pan_no, &pan_rules)
        .into_iter()
        .next()
    {
        errors.insert("identification.panNo", message);
    }

    for path in &BS_DATE_FIELDS[1..] {
        check_bs_date(form, *path, errors);
    }
}

fn check_address(section: &str, address: &Address, errors: &mut ErrorMap) {
    if !address.email.is_empty() && !is_valid_email(&address.email) {
        errors.insert(format!("{}.email", section), "Invalid email format");
    }
    if !address.mobile.is_empty() && !is_valid_mobile(&address.mobile) {
        errors.insert(format!("{}.mobile", section), "Mobile must be 10 digits");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::profile::{EducationEntry, FamilyMember};

    fn complete_form() -> ProfileForm {
        let mut form = ProfileForm::default();
        form.identification.account_holder_name_nepali = "राम थापा".to_string();
        form.identification.citizenship_no = "12-34-567".to_string();
        form.identification.citizenship_issue_place = "Kathmandu".to_string();
        form.identification.pan_no = "123456789".to_string();
        form
    }

    #[test]
    fn test_validate_field_messages() {
        assert_eq!(
            validate_field("Name", "", &FieldRules::required()),
            vec!["Name is required".to_string()]
        );
        assert!(validate_field("Email", "", &FieldRules::email()).is_empty());
        assert_eq!(
            validate_field("Email", "not-an-email", &FieldRules::email()),
            vec!["Invalid email format".to_string()]
        );
        assert_eq!(
            validate_field("Phone", "98123", &FieldRules::mobile()),
            vec!["Mobile number must be 10 digits".to_string()]
        );

        let rules = FieldRules {
            min_length: Some(5),
            max_length: Some(6),
            pattern: Some(Regex::new(r"^\d+$").unwrap()),
            ..FieldRules::default()
        };
        assert_eq!(
            validate_field("Code", "ab", &rules),
            vec![
                "Minimum 5 characters required".to_string(),
                "Invalid format".to_string()
            ]
        );
        assert_eq!(
            validate_field("Code", "1234567", &rules),
            vec!["Maximum 6 characters allowed".to_string()]
        );
    }

    #[test]
    fn test_realtime_ignores_empty_fields() {
        let errors = validate_realtime(&ProfileForm::default());
        assert!(errors.is_empty(), "{:?}", errors);
    }

    #[test]
    fn test_realtime_format_rules() {
        let mut form = ProfileForm::default();
        form.email = "ram@hrm".to_string();
        form.identification.citizenship_no = "123".to_string();
        form.identification.pan_no = "12345".to_string();
        form.identification.citizenship_issue_place = "   ".to_string();
        form.current_address.mobile = "98-123".to_string();
        form.permanent_address.email = "nobody".to_string();
        form.dob_bs = "2081-13-01".to_string();

        let errors = validate_realtime(&form);
        assert_eq!(errors.get("email"), Some("Invalid email format"));
        assert_eq!(
            errors.get("identification.citizenshipNo"),
            Some("Minimum 5 characters required")
        );
        assert_eq!(errors.get("identification.panNo"), Some("PAN must be 9 digits"));
        assert_eq!(
            errors.get("identification.citizenshipIssuePlace"),
            Some("Issue place is required")
        );
        assert_eq!(errors.get("currentAddress.mobile"), Some("Mobile must be 10 digits"));
        assert_eq!(errors.get("permanentAddress.email"), Some("Invalid email format"));
        assert!(errors.contains("dobBS"));
        assert_eq!(errors.first_key(), Some("email"));
    }

    #[test]
    fn test_submit_requires_identification() {
        let errors = validate_for_submit(&ProfileForm::default());
        assert_eq!(errors.len(), 4);
        assert_eq!(
            errors.first_key(),
            Some("identification.accountHolderNameNepali")
        );
        assert_eq!(errors.get("identification.panNo"), Some("PAN number is required"));
        assert_eq!(errors.summary(), "4 validation errors found");

        assert!(validate_for_submit(&complete_form()).is_empty());
    }

    #[test]
    fn test_submit_checks_list_entries() {
        let mut form = complete_form();
        form.family_members.push(FamilyMember {
            id: "1".to_string(),
            name: "Sita".to_string(),
            ..FamilyMember::default()
        });
        form.education.push(EducationEntry {
            id: "1".to_string(),
            degree: "SLC".to_string(),
            ..EducationEntry::default()
        });

        let errors = validate_for_submit(&form);
        assert_eq!(
            errors.get("familyMember.0.relationship"),
            Some("Relationship is required")
        );
        assert!(!errors.contains("familyMember.0.name"));
        assert_eq!(errors.get("education.0.institute"), Some("Institute is required"));
        assert_eq!(errors.summary(), "2 validation errors found");
    }

    #[test]
    fn test_error_map_keeps_first_message() {
        let mut errors = ErrorMap::new();
        errors.insert("panNo", "first");
        errors.insert("panNo", "second");
        errors.insert("email", "bad");
        assert_eq!(errors.get("panNo"), Some("first"));
        assert_eq!(errors.summary(), "2 validation errors found");
        assert_eq!(errors.remove("panNo"), Some("first".to_string()));
        assert_eq!(errors.summary(), "1 validation error found");
        assert_eq!(errors.into_map().len(), 1);
    }
}
