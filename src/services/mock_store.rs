//! Backend that keeps every collection as a JSON document in a [`Storage`].
//! Used for demos and offline work; it enforces the same role rules the
//! server does.

use crate::domain::model::{
    AttendanceFilter, AttendanceInput, AttendanceRecord, AttendanceUpdate, DashboardConfig,
    Department, DepartmentInput, DepartmentUpdate, JobRole, JobRoleInput, JobRoleUpdate,
    LeaveFilter, LeaveInput, LeaveRequest, LeaveStatus, NewUser, RoleFilter, Session, User,
    UserRole, UserStatus, UserUpdate,
};
use crate::domain::ports::{HrBackend, Storage};
use crate::domain::profile::ProfileDetails;
use crate::utils::error::{HrmError, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::{Mutex, OnceCell};

pub const USERS_KEY: &str = "hrm_users";
pub const DEPARTMENTS_KEY: &str = "hrm_departments";
pub const ROLES_KEY: &str = "hrm_roles";
pub const ATTENDANCE_KEY: &str = "hrm_attendance";
pub const LEAVES_KEY: &str = "hrm_leaves";
pub const DASHBOARD_CONFIG_KEY: &str = "hrm_dashboard_config";

pub const DEFAULT_ADMIN_EMAIL: &str = "admin@hrm.com";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin";

const DEFAULT_DEPARTMENTS: [(&str, &str, &str); 7] = [
    ("DEPT001", "Management", "Executive management and leadership"),
    ("DEPT002", "Human Resources", "HR operations and employee management"),
    ("DEPT003", "Engineering", "Software development and technical operations"),
    ("DEPT004", "Sales", "Sales and business development"),
    ("DEPT005", "Marketing", "Marketing and brand management"),
    ("DEPT006", "Finance", "Financial operations and accounting"),
    ("DEPT007", "Operations", "Business operations and support"),
];

fn require_manager(actor: &User, action: &str) -> Result<()> {
    if actor.role.is_manager() {
        Ok(())
    } else {
        Err(HrmError::Forbidden {
            message: format!("only HR or superadmin can {}", action),
        })
    }
}

fn require_superadmin(actor: &User, action: &str) -> Result<()> {
    if actor.role == UserRole::Superadmin {
        Ok(())
    } else {
        Err(HrmError::Forbidden {
            message: format!("only superadmin can {}", action),
        })
    }
}

fn require_self_or_manager(actor: &User, user_id: &str, action: &str) -> Result<()> {
    if actor.id == user_id || actor.role.is_manager() {
        Ok(())
    } else {
        Err(HrmError::Forbidden {
            message: format!("cannot {} another user's record", action),
        })
    }
}

fn not_found(entity: &str, id: impl ToString) -> HrmError {
    HrmError::NotFound {
        entity: entity.to_string(),
        id: id.to_string(),
    }
}

/// Next `{prefix}{n:04}` after the highest numeric suffix in use.
fn next_id<'a>(prefix: &str, existing: impl Iterator<Item = &'a str>) -> String {
    let max = existing
        .filter_map(|id| id.strip_prefix(prefix))
        .filter_map(|n| n.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    format!("{}{:04}", prefix, max + 1)
}

fn seeded_admin() -> User {
    let mut admin = User::new("SA001", "Super Admin", DEFAULT_ADMIN_EMAIL, UserRole::Superadmin);
    admin.password = Some(DEFAULT_ADMIN_PASSWORD.to_string());
    admin.department = Some("Management".to_string());
    admin.created_at = Some(Utc::now());
    admin
}

fn seeded_departments() -> Vec<Department> {
    DEFAULT_DEPARTMENTS
        .iter()
        .map(|(id, name, description)| Department {
            id: id.to_string(),
            name: name.to_string(),
            description: Some(description.to_string()),
            head_of_department: None,
            created_at: Some(Utc::now()),
        })
        .collect()
}

pub struct MockStore<S: Storage> {
    storage: S,
    seeded: OnceCell<()>,
    // serialises read-modify-write cycles on the collections
    write_lock: Mutex<()>,
}

impl<S: Storage> MockStore<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            seeded: OnceCell::new(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    async fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        self.ensure_seeded().await?;
        self.load_raw(key).await
    }

    async fn load_raw<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        match self.storage.read(key).await? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(Vec::new()),
        }
    }

    async fn save<T: Serialize + Sync>(&self, key: &str, items: &[T]) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(items)?;
        self.storage.write(key, &bytes).await
    }

    /// Writes the default superadmin and departments the first time a
    /// collection is missing.
    async fn ensure_seeded(&self) -> Result<()> {
        self.seeded
            .get_or_try_init(|| async {
                if self.storage.read(USERS_KEY).await?.is_none() {
                    tracing::info!("🌱 seeding default superadmin");
                    self.save(USERS_KEY, &[seeded_admin()]).await?;
                }
                if self.storage.read(DEPARTMENTS_KEY).await?.is_none() {
                    tracing::info!("🌱 seeding {} default departments", DEFAULT_DEPARTMENTS.len());
                    self.save(DEPARTMENTS_KEY, &seeded_departments()).await?;
                }
                Ok::<(), HrmError>(())
            })
            .await?;
        Ok(())
    }

    async fn find_user(&self, id: &str) -> Result<User> {
        self.load::<User>(USERS_KEY)
            .await?
            .into_iter()
            .find(|u| u.id == id)
            .ok_or_else(|| not_found("User", id))
    }
}

#[async_trait]
impl<S: Storage> HrBackend for MockStore<S> {
    async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let users: Vec<User> = self.load(USERS_KEY).await?;
        let user = users
            .into_iter()
            .find(|u| {
                u.email.eq_ignore_ascii_case(email.trim()) && u.password.as_deref() == Some(password)
            })
            .ok_or_else(|| HrmError::Unauthorized {
                message: "Incorrect email or password".to_string(),
            })?;

        if user.status != UserStatus::Active {
            return Err(HrmError::Forbidden {
                message: "User account is not active".to_string(),
            });
        }

        tracing::info!("🔑 {} signed in as {}", user.id, user.role);
        Ok(Session {
            access_token: format!("mock-token-{}", user.id),
            token_type: "bearer".to_string(),
            user: user.redacted(),
        })
    }

    async fn list_users(&self, actor: &User) -> Result<Vec<User>> {
        require_manager(actor, "list all users")?;
        let users: Vec<User> = self.load(USERS_KEY).await?;
        Ok(users.iter().map(User::redacted).collect())
    }

    async fn get_user(&self, actor: &User, id: &str) -> Result<User> {
        require_self_or_manager(actor, id, "view")?;
        Ok(self.find_user(id).await?.redacted())
    }

    async fn create_user(&self, actor: &User, input: NewUser) -> Result<User> {
        require_manager(actor, "create users")?;
        let role = input.role.unwrap_or(UserRole::Employee);
        if role != UserRole::Employee {
            require_superadmin(actor, &format!("create {} accounts", role))?;
        }

        let _guard = self.write_lock.lock().await;
        let mut users: Vec<User> = self.load(USERS_KEY).await?;
        if users.iter().any(|u| u.email.eq_ignore_ascii_case(&input.email)) {
            return Err(HrmError::Conflict {
                message: "Email already registered".to_string(),
            });
        }

        let id = next_id("EMP", users.iter().map(|u| u.id.as_str()));
        let mut user = User::new(id, input.name, input.email, role);
        user.password = Some(input.password);
        user.phone = input.phone;
        user.department = input.department;
        user.position = input.position;
        user.dob_bs = input.dob_bs;
        user.join_date = input.join_date;
        user.created_at = Some(Utc::now());

        users.push(user.clone());
        self.save(USERS_KEY, &users).await?;
        tracing::info!("👤 created {} {}", user.role, user.id);
        Ok(user.redacted())
    }

    async fn update_user(&self, actor: &User, id: &str, update: UserUpdate) -> Result<User> {
        require_self_or_manager(actor, id, "update")?;
        let touches_hr_fields = update.department.is_some()
            || update.position.is_some()
            || update.salary.is_some()
            || update.status.is_some()
            || update.resignation_date.is_some();
        if touches_hr_fields {
            require_manager(actor, "change department, position, salary or status")?;
        }

        let _guard = self.write_lock.lock().await;
        let mut users: Vec<User> = self.load(USERS_KEY).await?;
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| not_found("User", id))?;

        if let Some(name) = update.name {
            user.name = name;
        }
        if let Some(phone) = update.phone {
            user.phone = Some(phone);
        }
        if let Some(address) = update.address {
            user.address = Some(address);
        }
        if let Some(department) = update.department {
            user.department = Some(department);
        }
        if let Some(position) = update.position {
            user.position = Some(position);
        }
        if let Some(salary) = update.salary {
            user.salary = Some(salary);
        }
        if let Some(status) = update.status {
            user.status = status;
        }
        if let Some(date) = update.resignation_date {
            user.resignation_date = Some(date);
        }
        user.updated_at = Some(Utc::now());

        let updated = user.redacted();
        self.save(USERS_KEY, &users).await?;
        Ok(updated)
    }

    async fn delete_user(&self, actor: &User, id: &str) -> Result<()> {
        require_manager(actor, "delete users")?;

        let _guard = self.write_lock.lock().await;
        let mut users: Vec<User> = self.load(USERS_KEY).await?;
        let index = users
            .iter()
            .position(|u| u.id == id)
            .ok_or_else(|| not_found("User", id))?;
        if users[index].role == UserRole::Superadmin {
            return Err(HrmError::Forbidden {
                message: "superadmin accounts cannot be deleted".to_string(),
            });
        }

        let removed = users.remove(index);
        self.save(USERS_KEY, &users).await?;
        tracing::info!("🗑️ deleted user {}", removed.id);
        Ok(())
    }

    async fn update_profile(
        &self,
        actor: &User,
        user_id: &str,
        details: ProfileDetails,
    ) -> Result<User> {
        require_self_or_manager(actor, user_id, "edit the profile of")?;

        let _guard = self.write_lock.lock().await;
        let mut users: Vec<User> = self.load(USERS_KEY).await?;
        let user = users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| not_found("User", user_id))?;

        if !details.profile_image.is_empty() {
            user.profile_image = Some(details.profile_image.clone());
        }
        if !details.dob_bs.is_empty() {
            user.dob_bs = Some(details.dob_bs.clone());
        }
        if let Ok(dob) = details.date_of_birth.parse::<NaiveDate>() {
            user.dob_ad = Some(dob);
        }
        user.profile = Some(details);
        user.updated_at = Some(Utc::now());

        let updated = user.redacted();
        self.save(USERS_KEY, &users).await?;
        tracing::info!("📇 profile updated for {}", user_id);
        Ok(updated)
    }

    async fn list_departments(&self, _actor: &User) -> Result<Vec<Department>> {
        self.load(DEPARTMENTS_KEY).await
    }

    async fn create_department(&self, actor: &User, input: DepartmentInput) -> Result<Department> {
        require_manager(actor, "create departments")?;
        if input.name.trim().is_empty() {
            return Err(HrmError::ValidationError {
                message: "Department name is required".to_string(),
            });
        }

        let _guard = self.write_lock.lock().await;
        let mut departments: Vec<Department> = self.load(DEPARTMENTS_KEY).await?;
        if departments
            .iter()
            .any(|d| d.name.eq_ignore_ascii_case(input.name.trim()))
        {
            return Err(HrmError::Conflict {
                message: "Department name already exists".to_string(),
            });
        }

        let department = Department {
            id: next_id("DEPT", departments.iter().map(|d| d.id.as_str())),
            name: input.name.trim().to_string(),
            description: input.description,
            head_of_department: input.head_of_department,
            created_at: Some(Utc::now()),
        };
        departments.push(department.clone());
        self.save(DEPARTMENTS_KEY, &departments).await?;
        Ok(department)
    }

    async fn update_department(
        &self,
        actor: &User,
        id: &str,
        update: DepartmentUpdate,
    ) -> Result<Department> {
        require_manager(actor, "update departments")?;

        let _guard = self.write_lock.lock().await;
        let mut departments: Vec<Department> = self.load(DEPARTMENTS_KEY).await?;
        if let Some(name) = &update.name {
            if departments
                .iter()
                .any(|d| d.id != id && d.name.eq_ignore_ascii_case(name.trim()))
            {
                return Err(HrmError::Conflict {
                    message: "Department name already exists".to_string(),
                });
            }
        }

        let department = departments
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| not_found("Department", id))?;
        if let Some(name) = update.name {
            department.name = name.trim().to_string();
        }
        if let Some(description) = update.description {
            department.description = Some(description);
        }
        if let Some(head) = update.head_of_department {
            department.head_of_department = Some(head);
        }

        let updated = department.clone();
        self.save(DEPARTMENTS_KEY, &departments).await?;
        Ok(updated)
    }

    async fn delete_department(&self, actor: &User, id: &str) -> Result<()> {
        require_superadmin(actor, "delete departments")?;

        let _guard = self.write_lock.lock().await;
        let mut departments: Vec<Department> = self.load(DEPARTMENTS_KEY).await?;
        let index = departments
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| not_found("Department", id))?;

        let name = departments[index].name.clone();
        let users: Vec<User> = self.load(USERS_KEY).await?;
        let assigned = users
            .iter()
            .filter(|u| matches!(u.department.as_deref(), Some(d) if d == id || d == name))
            .count();
        if assigned > 0 {
            return Err(HrmError::Conflict {
                message: format!(
                    "Cannot delete department. {} employees are assigned to it.",
                    assigned
                ),
            });
        }

        departments.remove(index);
        self.save(DEPARTMENTS_KEY, &departments).await
    }

    async fn list_roles(&self, _actor: &User, filter: RoleFilter) -> Result<Vec<JobRole>> {
        let roles: Vec<JobRole> = self.load(ROLES_KEY).await?;
        Ok(roles
            .into_iter()
            .filter(|r| {
                filter
                    .department_id
                    .as_deref()
                    .map_or(true, |d| r.department_id == d)
                    && filter.level.as_deref().map_or(true, |l| r.level == l)
            })
            .collect())
    }

    async fn create_role(&self, actor: &User, input: JobRoleInput) -> Result<JobRole> {
        require_manager(actor, "create roles")?;
        if input.min_salary > input.max_salary {
            return Err(HrmError::ValidationError {
                message: "minimum salary cannot exceed maximum salary".to_string(),
            });
        }

        // department check and write share the lock
        let _guard = self.write_lock.lock().await;
        let departments: Vec<Department> = self.load(DEPARTMENTS_KEY).await?;
        if !departments.iter().any(|d| d.id == input.department_id) {
            return Err(not_found("Department", &input.department_id));
        }

        let mut roles: Vec<JobRole> = self.load(ROLES_KEY).await?;
        let role = JobRole {
            id: next_id("ROLE", roles.iter().map(|r| r.id.as_str())),
            title: input.title,
            department_id: input.department_id,
            level: input.level,
            min_salary: input.min_salary,
            max_salary: input.max_salary,
            description: input.description,
            created_at: Some(Utc::now()),
        };
        roles.push(role.clone());
        self.save(ROLES_KEY, &roles).await?;
        Ok(role)
    }

    async fn update_role(&self, actor: &User, id: &str, update: JobRoleUpdate) -> Result<JobRole> {
        require_manager(actor, "update roles")?;

        let _guard = self.write_lock.lock().await;
        if let Some(department_id) = &update.department_id {
            let departments: Vec<Department> = self.load(DEPARTMENTS_KEY).await?;
            if !departments.iter().any(|d| &d.id == department_id) {
                return Err(not_found("Department", department_id));
            }
        }
        let mut roles: Vec<JobRole> = self.load(ROLES_KEY).await?;
        let role = roles
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| not_found("Role", id))?;
        if let Some(title) = update.title {
            role.title = title;
        }
        if let Some(department_id) = update.department_id {
            role.department_id = department_id;
        }
        if let Some(level) = update.level {
            role.level = level;
        }
        if let Some(min) = update.min_salary {
            role.min_salary = min;
        }
        if let Some(max) = update.max_salary {
            role.max_salary = max;
        }
        if let Some(description) = update.description {
            role.description = Some(description);
        }
        if role.min_salary > role.max_salary {
            return Err(HrmError::ValidationError {
                message: "minimum salary cannot exceed maximum salary".to_string(),
            });
        }

        let updated = role.clone();
        self.save(ROLES_KEY, &roles).await?;
        Ok(updated)
    }

    async fn delete_role(&self, actor: &User, id: &str) -> Result<()> {
        require_superadmin(actor, "delete roles")?;

        let _guard = self.write_lock.lock().await;
        let mut roles: Vec<JobRole> = self.load(ROLES_KEY).await?;
        let before = roles.len();
        roles.retain(|r| r.id != id);
        if roles.len() == before {
            return Err(not_found("Role", id));
        }
        self.save(ROLES_KEY, &roles).await
    }

    async fn list_attendance(
        &self,
        actor: &User,
        mut filter: AttendanceFilter,
    ) -> Result<Vec<AttendanceRecord>> {
        if !actor.role.is_manager() {
            filter.user_id = Some(actor.id.clone());
        }
        let records: Vec<AttendanceRecord> = self.load(ATTENDANCE_KEY).await?;
        Ok(records.into_iter().filter(|r| filter.matches(r)).collect())
    }

    async fn create_attendance(
        &self,
        actor: &User,
        input: AttendanceInput,
    ) -> Result<AttendanceRecord> {
        require_manager(actor, "record attendance")?;
        self.find_user(&input.user_id).await?;

        let _guard = self.write_lock.lock().await;
        let mut records: Vec<AttendanceRecord> = self.load(ATTENDANCE_KEY).await?;
        if records
            .iter()
            .any(|r| r.user_id == input.user_id && r.date == input.date)
        {
            return Err(HrmError::Conflict {
                message: "Attendance record already exists for this date".to_string(),
            });
        }

        let record = AttendanceRecord {
            id: records.iter().map(|r| r.id).max().unwrap_or(0) + 1,
            user_id: input.user_id,
            date: input.date,
            check_in: input.check_in,
            check_out: input.check_out,
            status: input.status,
            late_reason: input.late_reason,
            created_at: Some(Utc::now()),
        };
        records.push(record.clone());
        self.save(ATTENDANCE_KEY, &records).await?;
        Ok(record)
    }

    async fn update_attendance(
        &self,
        actor: &User,
        id: i64,
        update: AttendanceUpdate,
    ) -> Result<AttendanceRecord> {
        require_manager(actor, "update attendance")?;

        let _guard = self.write_lock.lock().await;
        let mut records: Vec<AttendanceRecord> = self.load(ATTENDANCE_KEY).await?;
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| not_found("Attendance record", id))?;
        if let Some(check_out) = update.check_out {
            record.check_out = Some(check_out);
        }
        if let Some(status) = update.status {
            record.status = status;
        }
        if let Some(reason) = update.late_reason {
            record.late_reason = Some(reason);
        }

        let updated = record.clone();
        self.save(ATTENDANCE_KEY, &records).await?;
        Ok(updated)
    }

    async fn delete_attendance(&self, actor: &User, id: i64) -> Result<()> {
        require_superadmin(actor, "delete attendance records")?;

        let _guard = self.write_lock.lock().await;
        let mut records: Vec<AttendanceRecord> = self.load(ATTENDANCE_KEY).await?;
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Err(not_found("Attendance record", id));
        }
        self.save(ATTENDANCE_KEY, &records).await
    }

    async fn list_leaves(&self, actor: &User, mut filter: LeaveFilter) -> Result<Vec<LeaveRequest>> {
        if !actor.role.is_manager() {
            filter.user_id = Some(actor.id.clone());
        }
        let leaves: Vec<LeaveRequest> = self.load(LEAVES_KEY).await?;
        Ok(leaves
            .into_iter()
            .filter(|l| {
                filter.status.map_or(true, |s| l.status == s)
                    && filter.user_id.as_deref().map_or(true, |u| l.user_id == u)
            })
            .collect())
    }

    async fn create_leave(&self, actor: &User, input: LeaveInput) -> Result<LeaveRequest> {
        if input.end_date < input.start_date {
            return Err(HrmError::ValidationError {
                message: "end date cannot be before start date".to_string(),
            });
        }
        if input.reason.trim().is_empty() {
            return Err(HrmError::ValidationError {
                message: "Reason is required".to_string(),
            });
        }

        let _guard = self.write_lock.lock().await;
        let mut leaves: Vec<LeaveRequest> = self.load(LEAVES_KEY).await?;
        let leave = LeaveRequest {
            id: next_id("L", leaves.iter().map(|l| l.id.as_str())),
            user_id: actor.id.clone(),
            leave_type: input.leave_type,
            start_date: input.start_date,
            end_date: input.end_date,
            start_date_bs: input.start_date_bs,
            end_date_bs: input.end_date_bs,
            reason: input.reason,
            status: LeaveStatus::Pending,
            half_day: input.half_day,
            approved_by: None,
            approved_at: None,
            created_at: Some(Utc::now()),
        };
        leaves.push(leave.clone());
        self.save(LEAVES_KEY, &leaves).await?;
        tracing::info!("🏖️ {} requested {} day(s) of leave", actor.id, leave.days());
        Ok(leave)
    }

    async fn set_leave_status(
        &self,
        actor: &User,
        id: &str,
        status: LeaveStatus,
    ) -> Result<LeaveRequest> {
        require_manager(actor, "approve or reject leave")?;
        if status == LeaveStatus::Pending {
            return Err(HrmError::ValidationError {
                message: "leave can only be approved or rejected".to_string(),
            });
        }

        let _guard = self.write_lock.lock().await;
        let mut leaves: Vec<LeaveRequest> = self.load(LEAVES_KEY).await?;
        let leave = leaves
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| not_found("Leave request", id))?;
        leave.status = status;
        leave.approved_by = Some(actor.name.clone());
        leave.approved_at = Some(Utc::now());

        let updated = leave.clone();
        self.save(LEAVES_KEY, &leaves).await?;
        Ok(updated)
    }

    async fn delete_leave(&self, actor: &User, id: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut leaves: Vec<LeaveRequest> = self.load(LEAVES_KEY).await?;
        let index = leaves
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| not_found("Leave request", id))?;
        require_self_or_manager(actor, &leaves[index].user_id, "delete")?;

        leaves.remove(index);
        self.save(LEAVES_KEY, &leaves).await
    }

    async fn dashboard_config(&self, _actor: &User) -> Result<DashboardConfig> {
        match self.storage.read(DASHBOARD_CONFIG_KEY).await? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(DashboardConfig::default()),
        }
    }

    async fn set_dashboard_config(&self, actor: &User, config: DashboardConfig) -> Result<()> {
        require_superadmin(actor, "configure dashboards")?;
        let bytes = serde_json::to_vec_pretty(&config)?;
        self.storage.write(DASHBOARD_CONFIG_KEY, &bytes).await
    }
}
