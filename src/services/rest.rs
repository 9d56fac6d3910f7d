use crate::domain::model::{
    AttendanceFilter, AttendanceInput, AttendanceRecord, AttendanceUpdate, DashboardConfig,
    Department, DepartmentInput, DepartmentUpdate, JobRole, JobRoleInput, JobRoleUpdate,
    LeaveFilter, LeaveInput, LeaveRequest, LeaveStatus, NewUser, RoleFilter, Session, User,
    UserUpdate,
};
use crate::domain::ports::HrBackend;
use crate::domain::profile::ProfileDetails;
use crate::utils::error::{HrmError, Result};
use crate::utils::validation::validate_record_id;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::RwLock;
use url::Url;

pub const DEFAULT_API_PREFIX: &str = "/api/v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

/// `collection/id` with the id checked before it becomes a path segment.
fn resource(collection: &str, id: &str) -> Result<String> {
    validate_record_id("id", id)?;
    Ok(format!("{}/{}", collection, id))
}

#[derive(Serialize)]
struct LeaveStatusUpdate {
    status: LeaveStatus,
}

/// Client for the HR REST API. Role checks happen on the server; its
/// rejections come back as typed errors.
pub struct RestBackend {
    client: Client,
    base: Url,
    token: RwLock<Option<String>>,
}

impl RestBackend {
    pub fn new(base_url: &str, api_prefix: &str, timeout: Duration) -> Result<Self> {
        let joined = format!(
            "{}/{}/",
            base_url.trim_end_matches('/'),
            api_prefix.trim_matches('/')
        );
        let base = Url::parse(&joined).map_err(|e| HrmError::InvalidConfigValueError {
            field: "backend.base_url".to_string(),
            value: base_url.to_string(),
            reason: e.to_string(),
        })?;
        let client = Client::builder().timeout(timeout).build()?;

        tracing::debug!("🌐 REST backend at {}", base);
        Ok(Self {
            client,
            base,
            token: RwLock::new(None),
        })
    }

    pub async fn set_token(&self, token: Option<String>) {
        *self.token.write().await = token;
    }

    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| HrmError::ConfigError {
                message: format!("invalid endpoint '{}': {}", path, e),
            })
    }

    async fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.endpoint(path)?;
        tracing::debug!("📡 {} {}", method, url);
        let mut request = self
            .client
            .request(method, url)
            .header("Content-Type", "application/json");
        if let Some(token) = self.token().await {
            request = request.bearer_auth(token);
        }
        Ok(request)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = check_status(request.send().await?).await?;
        Ok(response.json().await?)
    }

    async fn send_empty(&self, request: RequestBuilder) -> Result<()> {
        check_status(request.send().await?).await?;
        Ok(())
    }
}

/// Turns non-2xx responses into errors, using FastAPI's `detail` when present.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().path().to_string();
    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("detail").map(|d| match d {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }))
        .unwrap_or_else(|| body.clone());

    tracing::warn!("📡 {} returned {}: {}", url, status, detail);
    Err(match status {
        StatusCode::UNAUTHORIZED => HrmError::Unauthorized { message: detail },
        StatusCode::FORBIDDEN => HrmError::Forbidden { message: detail },
        StatusCode::NOT_FOUND => HrmError::NotFound {
            entity: "Resource".to_string(),
            id: url,
        },
        StatusCode::BAD_REQUEST | StatusCode::CONFLICT => HrmError::Conflict { message: detail },
        StatusCode::UNPROCESSABLE_ENTITY => HrmError::ValidationError { message: detail },
        other => HrmError::BackendError {
            status: other.as_u16(),
            detail,
        },
    })
}

#[async_trait]
impl HrBackend for RestBackend {
    async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let request = self
            .request(Method::POST, "auth/login/json")
            .await?
            .json(&Credentials { email, password });
        let token: TokenResponse = self.send(request).await?;
        self.set_token(Some(token.access_token.clone())).await;

        let user: User = self.send(self.request(Method::GET, "users/me").await?).await?;
        tracing::info!("🔑 signed in as {} ({})", user.email, user.role);
        Ok(Session {
            access_token: token.access_token,
            token_type: token.token_type.unwrap_or_else(|| "bearer".to_string()),
            user,
        })
    }

    async fn list_users(&self, _actor: &User) -> Result<Vec<User>> {
        self.send(self.request(Method::GET, "users/").await?).await
    }

    async fn get_user(&self, actor: &User, id: &str) -> Result<User> {
        let path = if actor.id == id {
            "users/me".to_string()
        } else {
            resource("users", id)?
        };
        self.send(self.request(Method::GET, &path).await?).await
    }

    async fn create_user(&self, _actor: &User, input: NewUser) -> Result<User> {
        let request = self.request(Method::POST, "auth/register").await?.json(&input);
        self.send(request).await
    }

    async fn update_user(&self, _actor: &User, id: &str, update: UserUpdate) -> Result<User> {
        let request = self
            .request(Method::PUT, &resource("users", id)?)
            .await?
            .json(&update);
        self.send(request).await
    }

    async fn delete_user(&self, _actor: &User, id: &str) -> Result<()> {
        self.send_empty(self.request(Method::DELETE, &resource("users", id)?).await?)
            .await
    }

    async fn update_profile(
        &self,
        _actor: &User,
        user_id: &str,
        details: ProfileDetails,
    ) -> Result<User> {
        // users/{id} only takes account fields; profile details go to their own resource
        let request = self
            .request(Method::PUT, &format!("{}/profile", resource("users", user_id)?))
            .await?
            .json(&details);
        self.send(request).await
    }

    async fn list_departments(&self, _actor: &User) -> Result<Vec<Department>> {
        self.send(self.request(Method::GET, "departments/").await?).await
    }

    async fn create_department(&self, _actor: &User, input: DepartmentInput) -> Result<Department> {
        let request = self.request(Method::POST, "departments/").await?.json(&input);
        self.send(request).await
    }

    async fn update_department(
        &self,
        _actor: &User,
        id: &str,
        update: DepartmentUpdate,
    ) -> Result<Department> {
        let request = self
            .request(Method::PUT, &resource("departments", id)?)
            .await?
            .json(&update);
        self.send(request).await
    }

    async fn delete_department(&self, _actor: &User, id: &str) -> Result<()> {
        self.send_empty(
            self.request(Method::DELETE, &resource("departments", id)?)
                .await?,
        )
        .await
    }

    async fn list_roles(&self, _actor: &User, filter: RoleFilter) -> Result<Vec<JobRole>> {
        let mut request = self.request(Method::GET, "roles/").await?;
        if let Some(department_id) = &filter.department_id {
            request = request.query(&[("department_id", department_id)]);
        }
        if let Some(level) = &filter.level {
            request = request.query(&[("level", level)]);
        }
        self.send(request).await
    }

    async fn create_role(&self, _actor: &User, input: JobRoleInput) -> Result<JobRole> {
        let request = self.request(Method::POST, "roles/").await?.json(&input);
        self.send(request).await
    }

    async fn update_role(&self, _actor: &User, id: &str, update: JobRoleUpdate) -> Result<JobRole> {
        let request = self
            .request(Method::PUT, &resource("roles", id)?)
            .await?
            .json(&update);
        self.send(request).await
    }

    async fn delete_role(&self, _actor: &User, id: &str) -> Result<()> {
        self.send_empty(self.request(Method::DELETE, &resource("roles", id)?).await?)
            .await
    }

    async fn list_attendance(
        &self,
        actor: &User,
        filter: AttendanceFilter,
    ) -> Result<Vec<AttendanceRecord>> {
        // employees only have access to their own records
        let path = if actor.role.is_manager() {
            "attendance/"
        } else {
            "attendance/my"
        };
        let mut request = self.request(Method::GET, path).await?;
        if let Some(user_id) = filter.user_id.as_ref().filter(|_| actor.role.is_manager()) {
            request = request.query(&[("user_id", user_id)]);
        }
        if let Some(start) = filter.start_date {
            request = request.query(&[("start_date", start.to_string())]);
        }
        if let Some(end) = filter.end_date {
            request = request.query(&[("end_date", end.to_string())]);
        }
        self.send(request).await
    }

    async fn create_attendance(
        &self,
        _actor: &User,
        input: AttendanceInput,
    ) -> Result<AttendanceRecord> {
        let request = self.request(Method::POST, "attendance/").await?.json(&input);
        self.send(request).await
    }

    async fn update_attendance(
        &self,
        _actor: &User,
        id: i64,
        update: AttendanceUpdate,
    ) -> Result<AttendanceRecord> {
        let request = self
            .request(Method::PUT, &format!("attendance/{}", id))
            .await?
            .json(&update);
        self.send(request).await
    }

    async fn delete_attendance(&self, _actor: &User, id: i64) -> Result<()> {
        self.send_empty(
            self.request(Method::DELETE, &format!("attendance/{}", id))
                .await?,
        )
        .await
    }

    async fn list_leaves(&self, actor: &User, filter: LeaveFilter) -> Result<Vec<LeaveRequest>> {
        if !actor.role.is_manager() {
            return self.send(self.request(Method::GET, "leaves/my").await?).await;
        }
        let mut request = self.request(Method::GET, "leaves/").await?;
        if let Some(status) = filter.status {
            let status = serde_json::to_value(status)?;
            if let Some(status) = status.as_str() {
                request = request.query(&[("status", status)]);
            }
        }
        if let Some(user_id) = &filter.user_id {
            request = request.query(&[("user_id", user_id)]);
        }
        self.send(request).await
    }

    async fn create_leave(&self, _actor: &User, input: LeaveInput) -> Result<LeaveRequest> {
        let request = self.request(Method::POST, "leaves/").await?.json(&input);
        self.send(request).await
    }

    async fn set_leave_status(
        &self,
        _actor: &User,
        id: &str,
        status: LeaveStatus,
    ) -> Result<LeaveRequest> {
        let request = self
            .request(Method::PUT, &resource("leaves", id)?)
            .await?
            .json(&LeaveStatusUpdate { status });
        self.send(request).await
    }

    async fn delete_leave(&self, _actor: &User, id: &str) -> Result<()> {
        self.send_empty(self.request(Method::DELETE, &resource("leaves", id)?).await?)
            .await
    }

    /// The API has no dashboard endpoint; every role gets the built-in cards.
    async fn dashboard_config(&self, _actor: &User) -> Result<DashboardConfig> {
        Ok(DashboardConfig::default())
    }

    async fn set_dashboard_config(&self, _actor: &User, _config: DashboardConfig) -> Result<()> {
        Err(HrmError::ConfigError {
            message: "dashboard configuration can only be changed in mock mode".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joining() {
        let backend = RestBackend::new("http://localhost:8000/", "/api/v1", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(backend.base_url().as_str(), "http://localhost:8000/api/v1/");
        assert_eq!(
            backend.endpoint("/users/me").unwrap().as_str(),
            "http://localhost:8000/api/v1/users/me"
        );
        assert_eq!(
            backend.endpoint("departments/").unwrap().as_str(),
            "http://localhost:8000/api/v1/departments/"
        );
    }

    #[test]
    fn test_rejects_bad_base_url() {
        let err = RestBackend::new("not a url", DEFAULT_API_PREFIX, DEFAULT_TIMEOUT)
            .err()
            .unwrap();
        assert!(matches!(err, HrmError::InvalidConfigValueError { .. }));
    }
}
