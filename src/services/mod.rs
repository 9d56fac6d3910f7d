pub mod export;
pub mod mock_store;
pub mod rest;

pub use export::{attendance_csv_string, export_attendance_csv, summarize_attendance, AttendanceSummary};
pub use mock_store::MockStore;
pub use rest::RestBackend;

use crate::adapters::LocalStorage;
use crate::config::toml_config::{BackendMode, HrmConfig};
use crate::domain::model::{Session, User};
use crate::domain::ports::HrBackend;
use crate::routing::{authorize, Access, Route};
use crate::utils::error::{HrmError, Result};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Signed-in context over whichever backend is configured.
pub struct HrService {
    backend: Arc<dyn HrBackend>,
    session: RwLock<Option<Session>>,
}

impl HrService {
    pub fn new(backend: Arc<dyn HrBackend>) -> Self {
        Self {
            backend,
            session: RwLock::new(None),
        }
    }

    pub async fn from_config(config: &HrmConfig) -> Result<Self> {
        let backend: Arc<dyn HrBackend> = match config.backend.mode {
            BackendMode::Mock => {
                tracing::info!("🗂️ using local mock store at {}", config.storage.data_dir);
                Arc::new(MockStore::new(LocalStorage::new(config.data_dir())))
            }
            BackendMode::Rest => {
                tracing::info!("🌐 using REST backend at {}", config.backend.base_url);
                let rest = RestBackend::new(
                    &config.backend.base_url,
                    &config.backend.api_prefix,
                    config.timeout(),
                )?;
                if let Some(token) = config.token() {
                    rest.set_token(Some(token.to_string())).await;
                }
                Arc::new(rest)
            }
        };
        Ok(Self::new(backend))
    }

    pub fn backend(&self) -> &dyn HrBackend {
        self.backend.as_ref()
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let session = self.backend.login(email, password).await?;
        let user = session.user.clone();
        tracing::debug!("session opened for {}", user.email);
        *self.session.write().await = Some(session);
        Ok(user)
    }

    pub async fn logout(&self) {
        if let Some(session) = self.session.write().await.take() {
            tracing::info!("👋 {} signed out", session.user.email);
        }
    }

    pub async fn current_user(&self) -> Option<User> {
        self.session.read().await.as_ref().map(|s| s.user.clone())
    }

    /// The signed-in user, for passing to backend calls.
    pub async fn actor(&self) -> Result<User> {
        self.current_user().await.ok_or_else(|| HrmError::Unauthorized {
            message: "Not signed in".to_string(),
        })
    }

    /// Keeps the cached user in step after a profile save.
    pub async fn refresh_user(&self, user: User) {
        if let Some(session) = self.session.write().await.as_mut() {
            if session.user.id == user.id {
                session.user = user;
            }
        }
    }

    pub async fn authorize(&self, route: Route) -> Access {
        let user = self.current_user().await;
        authorize(route, user.as_ref())
    }

    /// Card ids configured for the signed-in user's dashboard.
    pub async fn dashboard_cards(&self) -> Result<Vec<String>> {
        let actor = self.actor().await?;
        let config = self.backend.dashboard_config(&actor).await?;
        Ok(config.cards_for(actor.role).to_vec())
    }
}
