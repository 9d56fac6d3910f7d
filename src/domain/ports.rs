use crate::domain::model::{
    AttendanceFilter, AttendanceInput, AttendanceRecord, AttendanceUpdate, DashboardConfig,
    Department, DepartmentInput, DepartmentUpdate, JobRole, JobRoleInput, JobRoleUpdate,
    LeaveFilter, LeaveInput, LeaveRequest, LeaveStatus, NewUser, RoleFilter, Session, User,
    UserUpdate,
};
use crate::domain::profile::ProfileDetails;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Key/value persistence for JSON blobs (drafts, mock collections).
pub trait Storage: Send + Sync {
    /// `Ok(None)` when nothing is stored under `key`.
    fn read(&self, key: &str)
        -> impl std::future::Future<Output = Result<Option<Vec<u8>>>> + Send;
    fn write(&self, key: &str, data: &[u8])
        -> impl std::future::Future<Output = Result<()>> + Send;
    fn remove(&self, key: &str) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Role-aware data layer. Every call names the acting user so the
/// implementation can enforce who may do what.
#[async_trait]
pub trait HrBackend: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<Session>;

    async fn list_users(&self, actor: &User) -> Result<Vec<User>>;
    async fn get_user(&self, actor: &User, id: &str) -> Result<User>;
    async fn create_user(&self, actor: &User, input: NewUser) -> Result<User>;
    async fn update_user(&self, actor: &User, id: &str, update: UserUpdate) -> Result<User>;
    async fn delete_user(&self, actor: &User, id: &str) -> Result<()>;
    async fn update_profile(
        &self,
        actor: &User,
        user_id: &str,
        details: ProfileDetails,
    ) -> Result<User>;

    async fn list_departments(&self, actor: &User) -> Result<Vec<Department>>;
    async fn create_department(&self, actor: &User, input: DepartmentInput) -> Result<Department>;
    async fn update_department(
        &self,
        actor: &User,
        id: &str,
        update: DepartmentUpdate,
    ) -> Result<Department>;
    async fn delete_department(&self, actor: &User, id: &str) -> Result<()>;

    async fn list_roles(&self, actor: &User, filter: RoleFilter) -> Result<Vec<JobRole>>;
    async fn create_role(&self, actor: &User, input: JobRoleInput) -> Result<JobRole>;
    async fn update_role(&self, actor: &User, id: &str, update: JobRoleUpdate) -> Result<JobRole>;
    async fn delete_role(&self, actor: &User, id: &str) -> Result<()>;

    async fn list_attendance(
        &self,
        actor: &User,
        filter: AttendanceFilter,
    ) -> Result<Vec<AttendanceRecord>>;
    async fn create_attendance(
        &self,
        actor: &User,
        input: AttendanceInput,
    ) -> Result<AttendanceRecord>;
    async fn update_attendance(
        &self,
        actor: &User,
        id: i64,
        update: AttendanceUpdate,
    ) -> Result<AttendanceRecord>;
    async fn delete_attendance(&self, actor: &User, id: i64) -> Result<()>;

    async fn list_leaves(&self, actor: &User, filter: LeaveFilter) -> Result<Vec<LeaveRequest>>;
    async fn create_leave(&self, actor: &User, input: LeaveInput) -> Result<LeaveRequest>;
    async fn set_leave_status(
        &self,
        actor: &User,
        id: &str,
        status: LeaveStatus,
    ) -> Result<LeaveRequest>;
    async fn delete_leave(&self, actor: &User, id: &str) -> Result<()>;

    async fn dashboard_config(&self, actor: &User) -> Result<DashboardConfig>;
    async fn set_dashboard_config(&self, actor: &User, config: DashboardConfig) -> Result<()>;
}
