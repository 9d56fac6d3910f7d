use crate::domain::profile::ProfileDetails;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Superadmin,
    Hr,
    Employee,
}

impl UserRole {
    pub const ALL: [UserRole; 3] = [UserRole::Superadmin, UserRole::Hr, UserRole::Employee];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Superadmin => "superadmin",
            UserRole::Hr => "hr",
            UserRole::Employee => "employee",
        }
    }

    /// HR staff and the superadmin manage other people's records.
    pub fn is_manager(&self) -> bool {
        matches!(self, UserRole::Hr | UserRole::Superadmin)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "superadmin" => Ok(UserRole::Superadmin),
            "hr" => Ok(UserRole::Hr),
            "employee" => Ok(UserRole::Employee),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UserStatus {
    #[default]
    Active,
    Deactive,
    Resigned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Present,
    Late,
    Absent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LeaveStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub manager: Option<String>,
    #[serde(default)]
    pub salary: Option<f64>,
    #[serde(default)]
    pub dob_ad: Option<NaiveDate>,
    #[serde(default)]
    pub dob_bs: Option<String>,
    #[serde(default)]
    pub join_date: Option<NaiveDate>,
    #[serde(default)]
    pub join_date_bs: Option<String>,
    #[serde(default)]
    pub status: UserStatus,
    #[serde(default)]
    pub resignation_date: Option<NaiveDate>,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<ProfileDetails>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>, role: UserRole) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            name: name.into(),
            role,
            password: None,
            phone: None,
            address: None,
            department: None,
            position: None,
            manager: None,
            salary: None,
            dob_ad: None,
            dob_bs: None,
            join_date: None,
            join_date_bs: None,
            status: UserStatus::Active,
            resignation_date: None,
            profile_image: None,
            profile: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Initials shown in place of a missing avatar.
    pub fn avatar(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .take(2)
            .collect::<String>()
            .to_uppercase()
    }

    /// Copy safe to hand out: never carries the stored password.
    pub fn redacted(&self) -> Self {
        Self {
            password: None,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password: String,
    pub role: Option<UserRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dob_bs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<UserStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resignation_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub user: User,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub head_of_department: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DepartmentInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head_of_department: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DepartmentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head_of_department: Option<String>,
}

/// A job role (title + salary band) inside a department; not to be confused
/// with the access [`UserRole`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRole {
    pub id: String,
    pub title: String,
    pub department_id: String,
    pub level: String,
    pub min_salary: f64,
    pub max_salary: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobRoleInput {
    pub title: String,
    pub department_id: String,
    pub level: String,
    pub min_salary: f64,
    pub max_salary: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobRoleUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_salary: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_salary: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RoleFilter {
    pub department_id: Option<String>,
    pub level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: i64,
    pub user_id: String,
    pub date: NaiveDate,
    pub check_in: String,
    #[serde(default)]
    pub check_out: Option<String>,
    pub status: AttendanceStatus,
    #[serde(default)]
    pub late_reason: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceInput {
    pub user_id: String,
    pub date: NaiveDate,
    pub check_in: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_out: Option<String>,
    pub status: AttendanceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub late_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttendanceUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_out: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AttendanceStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub late_reason: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AttendanceFilter {
    pub user_id: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl AttendanceFilter {
    pub fn matches(&self, record: &AttendanceRecord) -> bool {
        self.user_id.as_deref().map_or(true, |id| record.user_id == id)
            && self.start_date.map_or(true, |start| record.date >= start)
            && self.end_date.map_or(true, |end| record.date <= end)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveRequest {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub leave_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub start_date_bs: Option<String>,
    #[serde(default)]
    pub end_date_bs: Option<String>,
    pub reason: String,
    #[serde(default)]
    pub status: LeaveStatus,
    #[serde(default)]
    pub half_day: bool,
    #[serde(default)]
    pub approved_by: Option<String>,
    #[serde(default)]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl LeaveRequest {
    /// Calendar days covered, both ends inclusive; a half-day request counts 0.5.
    pub fn days(&self) -> f64 {
        leave_days(self.start_date, self.end_date, self.half_day)
    }
}

pub fn leave_days(start: NaiveDate, end: NaiveDate, half_day: bool) -> f64 {
    if end < start {
        return 0.0;
    }
    if half_day {
        return 0.5;
    }
    ((end - start).num_days() + 1) as f64
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveInput {
    #[serde(rename = "type")]
    pub leave_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date_bs: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date_bs: Option<String>,
    pub reason: String,
    #[serde(default)]
    pub half_day: bool,
}

#[derive(Debug, Clone, Default)]
pub struct LeaveFilter {
    pub status: Option<LeaveStatus>,
    pub user_id: Option<String>,
}

pub const DASHBOARD_CARDS: [(&str, &str); 4] = [
    ("totalEmployees", "Total Employees"),
    ("leaveBalance", "Leave Balance"),
    ("newHires", "New Hires"),
    ("attendanceRate", "Attendance"),
];

/// Which dashboard cards each role sees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardConfig(pub BTreeMap<UserRole, Vec<String>>);

impl DashboardConfig {
    pub fn cards_for(&self, role: UserRole) -> &[String] {
        self.0.get(&role).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        let cards = |ids: &[&str]| ids.iter().map(|id| id.to_string()).collect::<Vec<_>>();
        let mut map = BTreeMap::new();
        map.insert(
            UserRole::Superadmin,
            cards(&["totalEmployees", "leaveBalance", "newHires", "attendanceRate"]),
        );
        map.insert(UserRole::Hr, cards(&["totalEmployees", "leaveBalance", "attendanceRate"]));
        map.insert(UserRole::Employee, cards(&["leaveBalance"]));
        Self(map)
    }
}
