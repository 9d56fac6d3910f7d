//! Shape of the self-service profile form, plus typed paths into it.
//!
//! JSON uses the camelCase keys the form has always been stored with, and the
//! dotted form of a [`FieldPath`] doubles as the key of a validation error.

use crate::domain::model::User;
use crate::utils::error::{HrmError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Generates a field enum with its wire name, the full variant list and
/// `FromStr`.
macro_rules! form_fields {
    ($name:ident { $($variant:ident => $key:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn key(&self) -> &'static str {
                match self {
                    $($name::$variant => $key),+
                }
            }
        }

        impl FromStr for $name {
            type Err = HrmError;

            fn from_str(s: &str) -> Result<Self> {
                match s {
                    $($key => Ok($name::$variant),)+
                    other => Err(HrmError::ValidationError {
                        message: format!("unknown {} field '{}'", stringify!($name), other),
                    }),
                }
            }
        }
    };
}

form_fields!(ProfileField {
    ProfileImage => "profileImage",
    Name => "name",
    Email => "email",
    Phone => "phone",
    Role => "role",
    Department => "department",
    Manager => "manager",
    JoiningDate => "joiningDate",
    JoiningDateBs => "joiningDateBS",
    DateOfBirth => "dateOfBirth",
    DobBs => "dobBS",
    Gender => "gender",
    Age => "age",
    Religion => "religion",
    Nationality => "nationality",
});

impl ProfileField {
    /// Owned by HR; shown but never edited from the profile page.
    pub fn is_read_only(&self) -> bool {
        matches!(
            self,
            ProfileField::Name
                | ProfileField::Email
                | ProfileField::Phone
                | ProfileField::Role
                | ProfileField::Department
                | ProfileField::Manager
                | ProfileField::JoiningDate
                | ProfileField::JoiningDateBs
        )
    }
}

form_fields!(IdentificationField {
    AccountHolderNameNepali => "accountHolderNameNepali",
    CitizenshipNo => "citizenshipNo",
    CitizenshipIssueDate => "citizenshipIssueDate",
    CitizenshipIssueDateBs => "citizenshipIssueDateBS",
    CitizenshipIssuePlace => "citizenshipIssuePlace",
    CitizenshipDocument => "citizenshipDocument",
    NationalIdCardNo => "nationalIdCardNo",
    NationalIdCardIssueDate => "nationalIdCardIssueDate",
    NationalIdCardIssueDateBs => "nationalIdCardIssueDateBS",
    NationalIdCardIssuePlace => "nationalIdCardIssuePlace",
    NationalIdCardDocument => "nationalIdCardDocument",
    DrivingLicenseNo => "drivingLicenseNo",
    DrivingLicenseIssueDate => "drivingLicenseIssueDate",
    DrivingLicenseIssueDateBs => "drivingLicenseIssueDateBS",
    DrivingLicenseIssuingAuthority => "drivingLicenseIssuingAuthority",
    DrivingLicenseDocument => "drivingLicenseDocument",
    PanNo => "panNo",
    PanDocument => "panDocument",
    PassportNo => "passportNo",
    AccountNo => "accountNo",
});

form_fields!(AddressField {
    HouseNo => "houseNo",
    WardNo => "wardNo",
    Street => "street",
    Municipality => "municipality",
    District => "district",
    Province => "province",
    Tel => "tel",
    Fax => "fax",
    Mobile => "mobile",
    Email => "email",
});

form_fields!(FamilyMemberField {
    Relationship => "relationship",
    Name => "name",
    Contact => "contact",
    Occupation => "occupation",
    Remarks => "remarks",
});

form_fields!(EducationField {
    Degree => "degree",
    Institute => "institute",
    Board => "board",
    Year => "year",
    Grade => "grade",
    Document => "document",
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Identification {
    pub account_holder_name_nepali: String,
    pub citizenship_no: String,
    pub citizenship_issue_date: String,
    #[serde(rename = "citizenshipIssueDateBS")]
    pub citizenship_issue_date_bs: String,
    pub citizenship_issue_place: String,
    pub citizenship_document: String,
    pub national_id_card_no: String,
    pub national_id_card_issue_date: String,
    #[serde(rename = "nationalIdCardIssueDateBS")]
    pub national_id_card_issue_date_bs: String,
    pub national_id_card_issue_place: String,
    pub national_id_card_document: String,
    pub driving_license_no: String,
    pub driving_license_issue_date: String,
    #[serde(rename = "drivingLicenseIssueDateBS")]
    pub driving_license_issue_date_bs: String,
    pub driving_license_issuing_authority: String,
    pub driving_license_document: String,
    pub pan_no: String,
    pub pan_document: String,
    pub passport_no: String,
    pub account_no: String,
}

impl Identification {
    pub fn get(&self, field: IdentificationField) -> &str {
        use IdentificationField::*;
        match field {
            AccountHolderNameNepali => &self.account_holder_name_nepali,
            CitizenshipNo => &self.citizenship_no,
            CitizenshipIssueDate => &self.citizenship_issue_date,
            CitizenshipIssueDateBs => &self.citizenship_issue_date_bs,
            CitizenshipIssuePlace => &self.citizenship_issue_place,
            CitizenshipDocument => &self.citizenship_document,
            NationalIdCardNo => &self.national_id_card_no,
            NationalIdCardIssueDate => &self.national_id_card_issue_date,
            NationalIdCardIssueDateBs => &self.national_id_card_issue_date_bs,
            NationalIdCardIssuePlace => &self.national_id_card_issue_place,
            NationalIdCardDocument => &self.national_id_card_document,
            DrivingLicenseNo => &self.driving_license_no,
            DrivingLicenseIssueDate => &self.driving_license_issue_date,
            DrivingLicenseIssueDateBs => &self.driving_license_issue_date_bs,
            DrivingLicenseIssuingAuthority => &self.driving_license_issuing_authority,
            DrivingLicenseDocument => &self.driving_license_document,
            PanNo => &self.pan_no,
            PanDocument => &self.pan_document,
            PassportNo => &self.passport_no,
            AccountNo => &self.account_no,
        }
    }

    pub fn get_mut(&mut self, field: IdentificationField) -> &mut String {
        use IdentificationField::*;
        match field {
            AccountHolderNameNepali => &mut self.account_holder_name_nepali,
            CitizenshipNo => &mut self.citizenship_no,
            CitizenshipIssueDate => &mut self.citizenship_issue_date,
            CitizenshipIssueDateBs => &mut self.citizenship_issue_date_bs,
            CitizenshipIssuePlace => &mut self.citizenship_issue_place,
            CitizenshipDocument => &mut self.citizenship_document,
            NationalIdCardNo => &mut self.national_id_card_no,
            NationalIdCardIssueDate => &mut self.national_id_card_issue_date,
            NationalIdCardIssueDateBs => &mut self.national_id_card_issue_date_bs,
            NationalIdCardIssuePlace => &mut self.national_id_card_issue_place,
            NationalIdCardDocument => &mut self.national_id_card_document,
            DrivingLicenseNo => &mut self.driving_license_no,
            DrivingLicenseIssueDate => &mut self.driving_license_issue_date,
            DrivingLicenseIssueDateBs => &mut self.driving_license_issue_date_bs,
            DrivingLicenseIssuingAuthority => &mut self.driving_license_issuing_authority,
            DrivingLicenseDocument => &mut self.driving_license_document,
            PanNo => &mut self.pan_no,
            PanDocument => &mut self.pan_document,
            PassportNo => &mut self.passport_no,
            AccountNo => &mut self.account_no,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    pub house_no: String,
    pub ward_no: String,
    pub street: String,
    pub municipality: String,
    pub district: String,
    pub province: String,
    pub tel: String,
    pub fax: String,
    pub mobile: String,
    pub email: String,
}

impl Address {
    pub fn get(&self, field: AddressField) -> &str {
        use AddressField::*;
        match field {
            HouseNo => &self.house_no,
            WardNo => &self.ward_no,
            Street => &self.street,
            Municipality => &self.municipality,
            District => &self.district,
            Province => &self.province,
            Tel => &self.tel,
            Fax => &self.fax,
            Mobile => &self.mobile,
            Email => &self.email,
        }
    }

    pub fn get_mut(&mut self, field: AddressField) -> &mut String {
        use AddressField::*;
        match field {
            HouseNo => &mut self.house_no,
            WardNo => &mut self.ward_no,
            Street => &mut self.street,
            Municipality => &mut self.municipality,
            District => &mut self.district,
            Province => &mut self.province,
            Tel => &mut self.tel,
            Fax => &mut self.fax,
            Mobile => &mut self.mobile,
            Email => &mut self.email,
        }
    }

    /// Province, district and municipality are all filled in.
    pub fn is_complete(&self) -> bool {
        !self.province.is_empty() && !self.district.is_empty() && !self.municipality.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FamilyMember {
    pub id: String,
    pub relationship: String,
    pub name: String,
    pub contact: String,
    pub occupation: String,
    pub remarks: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EducationEntry {
    pub id: String,
    #[serde(alias = "level")]
    pub degree: String,
    #[serde(alias = "institution")]
    pub institute: String,
    pub board: String,
    #[serde(alias = "passedYear")]
    pub year: String,
    pub grade: String,
    pub document: String,
}

/// Typed address of a single scalar form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldPath {
    Profile(ProfileField),
    Identification(IdentificationField),
    CurrentAddress(AddressField),
    PermanentAddress(AddressField),
}

/// Nested blocks addressed by `handle_nested_change`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Identification,
    CurrentAddress,
    PermanentAddress,
}

impl Section {
    pub fn key(&self) -> &'static str {
        match self {
            Section::Identification => "identification",
            Section::CurrentAddress => "currentAddress",
            Section::PermanentAddress => "permanentAddress",
        }
    }

    pub fn path(&self, field: &str) -> Result<FieldPath> {
        Ok(match self {
            Section::Identification => FieldPath::Identification(field.parse()?),
            Section::CurrentAddress => FieldPath::CurrentAddress(field.parse()?),
            Section::PermanentAddress => FieldPath::PermanentAddress(field.parse()?),
        })
    }
}

impl FromStr for Section {
    type Err = HrmError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "identification" => Ok(Section::Identification),
            "currentAddress" => Ok(Section::CurrentAddress),
            "permanentAddress" => Ok(Section::PermanentAddress),
            other => Err(HrmError::ValidationError {
                message: format!("unknown form section '{}'", other),
            }),
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldPath::Profile(field) => f.write_str(field.key()),
            FieldPath::Identification(field) => write!(f, "identification.{}", field.key()),
            FieldPath::CurrentAddress(field) => write!(f, "currentAddress.{}", field.key()),
            FieldPath::PermanentAddress(field) => write!(f, "permanentAddress.{}", field.key()),
        }
    }
}

impl FromStr for FieldPath {
    type Err = HrmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once('.') {
            Some((section, field)) => section.parse::<Section>()?.path(field),
            None => Ok(FieldPath::Profile(s.parse()?)),
        }
    }
}

/// Everything the profile page persists for a user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileDetails {
    pub profile_image: String,
    pub identification: Identification,
    pub family_members: Vec<FamilyMember>,
    pub education: Vec<EducationEntry>,
    pub current_address: Address,
    pub permanent_address: Address,
    pub nationality: String,
    pub religion: String,
    pub date_of_birth: String,
    #[serde(rename = "dobBS")]
    pub dob_bs: String,
    #[serde(rename = "joiningDateBS")]
    pub joining_date_bs: String,
    pub gender: String,
    pub age: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileForm {
    pub profile_image: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: String,
    pub department: String,
    pub manager: String,
    pub joining_date: String,
    #[serde(rename = "joiningDateBS")]
    pub joining_date_bs: String,
    pub date_of_birth: String,
    #[serde(rename = "dobBS")]
    pub dob_bs: String,
    pub gender: String,
    pub age: String,
    pub religion: String,
    pub nationality: String,
    pub identification: Identification,
    pub family_members: Vec<FamilyMember>,
    pub education: Vec<EducationEntry>,
    pub current_address: Address,
    pub permanent_address: Address,
}

impl ProfileForm {
    pub fn from_user(user: &User) -> Self {
        let details = user.profile.clone().unwrap_or_default();
        let or = |primary: &str, fallback: Option<&String>| {
            if primary.is_empty() {
                fallback.cloned().unwrap_or_default()
            } else {
                primary.to_string()
            }
        };

        Self {
            profile_image: or(&details.profile_image, user.profile_image.as_ref()),
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone().unwrap_or_default(),
            role: user.role.to_string(),
            department: user.department.clone().unwrap_or_default(),
            manager: user.manager.clone().unwrap_or_default(),
            joining_date: user.join_date.map(|d| d.to_string()).unwrap_or_default(),
            joining_date_bs: or(&details.joining_date_bs, user.join_date_bs.as_ref()),
            date_of_birth: if details.date_of_birth.is_empty() {
                user.dob_ad.map(|d| d.to_string()).unwrap_or_default()
            } else {
                details.date_of_birth
            },
            dob_bs: or(&details.dob_bs, user.dob_bs.as_ref()),
            gender: details.gender,
            age: details.age,
            religion: details.religion,
            nationality: details.nationality,
            identification: details.identification,
            family_members: details.family_members,
            education: details.education,
            current_address: details.current_address,
            permanent_address: details.permanent_address,
        }
    }

    /// The editable part sent on save.
    pub fn details(&self) -> ProfileDetails {
        ProfileDetails {
            profile_image: self.profile_image.clone(),
            identification: self.identification.clone(),
            family_members: self.family_members.clone(),
            education: self.education.clone(),
            current_address: self.current_address.clone(),
            permanent_address: self.permanent_address.clone(),
            nationality: self.nationality.clone(),
            religion: self.religion.clone(),
            date_of_birth: self.date_of_birth.clone(),
            dob_bs: self.dob_bs.clone(),
            joining_date_bs: self.joining_date_bs.clone(),
            gender: self.gender.clone(),
            age: self.age.clone(),
        }
    }

    pub fn get(&self, path: FieldPath) -> &str {
        match path {
            FieldPath::Profile(field) => self.profile_field(field),
            FieldPath::Identification(field) => self.identification.get(field),
            FieldPath::CurrentAddress(field) => self.current_address.get(field),
            FieldPath::PermanentAddress(field) => self.permanent_address.get(field),
        }
    }

    pub fn get_mut(&mut self, path: FieldPath) -> &mut String {
        match path {
            FieldPath::Profile(field) => self.profile_field_mut(field),
            FieldPath::Identification(field) => self.identification.get_mut(field),
            FieldPath::CurrentAddress(field) => self.current_address.get_mut(field),
            FieldPath::PermanentAddress(field) => self.permanent_address.get_mut(field),
        }
    }

    fn profile_field(&self, field: ProfileField) -> &str {
        use ProfileField::*;
        match field {
            ProfileImage => &self.profile_image,
            Name => &self.name,
            Email => &self.email,
            Phone => &self.phone,
            Role => &self.role,
            Department => &self.department,
            Manager => &self.manager,
            JoiningDate => &self.joining_date,
            JoiningDateBs => &self.joining_date_bs,
            DateOfBirth => &self.date_of_birth,
            DobBs => &self.dob_bs,
            Gender => &self.gender,
            Age => &self.age,
            Religion => &self.religion,
            Nationality => &self.nationality,
        }
    }

    fn profile_field_mut(&mut self, field: ProfileField) -> &mut String {
        use ProfileField::*;
        match field {
            ProfileImage => &mut self.profile_image,
            Name => &mut self.name,
            Email => &mut self.email,
            Phone => &mut self.phone,
            Role => &mut self.role,
            Department => &mut self.department,
            Manager => &mut self.manager,
            JoiningDate => &mut self.joining_date,
            JoiningDateBs => &mut self.joining_date_bs,
            DateOfBirth => &mut self.date_of_birth,
            DobBs => &mut self.dob_bs,
            Gender => &mut self.gender,
            Age => &mut self.age,
            Religion => &mut self.religion,
            Nationality => &mut self.nationality,
        }
    }
}
