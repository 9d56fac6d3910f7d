use crate::profile::ProfileSettings;
use crate::utils::error::{HrmError, Result};
use crate::utils::validation::{
    validate_one_of, validate_path, validate_positive_number, validate_range, validate_url,
    Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    #[default]
    Mock,
    Rest,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HrmConfig {
    pub backend: BackendConfig,
    pub storage: StorageConfig,
    pub profile: ProfileConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub mode: BackendMode,
    pub base_url: String,
    pub api_prefix: String,
    pub timeout_seconds: u64,
    pub token: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            mode: BackendMode::Mock,
            base_url: "http://localhost:8000".to_string(),
            api_prefix: "/api/v1".to_string(),
            timeout_seconds: 10,
            token: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./hrm-data".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    pub autosave_seconds: u64,
    pub draft_max_age_hours: u64,
    pub validation_debounce_ms: u64,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            autosave_seconds: 30,
            draft_max_age_hours: 24,
            validation_debounce_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
        }
    }
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").unwrap())
}

impl HrmConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(HrmError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| HrmError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${HRM_TOKEN})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn validate_config(&self) -> Result<()> {
        if self.backend.mode == BackendMode::Rest {
            validate_url("backend.base_url", &self.backend.base_url)?;
        }
        validate_range("backend.timeout_seconds", self.backend.timeout_seconds, 1, 300)?;
        validate_path("storage.data_dir", &self.storage.data_dir)?;

        validate_positive_number("profile.autosave_seconds", self.profile.autosave_seconds, 1)?;
        validate_range(
            "profile.draft_max_age_hours",
            self.profile.draft_max_age_hours,
            1,
            24 * 30,
        )?;
        validate_range(
            "profile.validation_debounce_ms",
            self.profile.validation_debounce_ms,
            0,
            10_000,
        )?;

        validate_one_of("logging.format", &self.logging.format, &["compact", "json"])?;
        validate_one_of(
            "logging.level",
            &self.logging.level,
            &["trace", "debug", "info", "warn", "error"],
        )?;
        Ok(())
    }

    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.storage.data_dir)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.backend.timeout_seconds)
    }

    /// Token to send, ignoring a `${VAR}` placeholder whose variable was unset.
    pub fn token(&self) -> Option<&str> {
        self.backend
            .token
            .as_deref()
            .filter(|t| !t.is_empty() && !env_var_pattern().is_match(t))
    }

    pub fn profile_settings(&self) -> ProfileSettings {
        ProfileSettings {
            autosave_interval: chrono::Duration::seconds(self.profile.autosave_seconds as i64),
            draft_max_age: chrono::Duration::hours(self.profile.draft_max_age_hours as i64),
            validation_debounce: Duration::from_millis(self.profile.validation_debounce_ms),
        }
    }
}

impl Validate for HrmConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_from_empty_file() {
        let config = HrmConfig::from_toml_str("").unwrap();
        assert_eq!(config.backend.mode, BackendMode::Mock);
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.profile.autosave_seconds, 30);
        assert!(config.validate().is_ok());

        let settings = config.profile_settings();
        assert_eq!(settings.draft_max_age, chrono::Duration::hours(24));
        assert_eq!(settings.validation_debounce, Duration::from_millis(500));
    }

    #[test]
    fn test_parse_rest_config() {
        let toml_content = r#"
[backend]
mode = "rest"
base_url = "https://hr.example.com"
timeout_seconds = 5

[storage]
data_dir = "/var/lib/hrm"

[profile]
autosave_seconds = 15

[logging]
format = "json"
"#;

        let config = HrmConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.backend.mode, BackendMode::Rest);
        assert_eq!(config.backend.api_prefix, "/api/v1");
        assert_eq!(config.data_dir(), PathBuf::from("/var/lib/hrm"));
        assert_eq!(
            config.profile_settings().autosave_interval,
            chrono::Duration::seconds(15)
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("HRM_TEST_TOKEN_A", "secret-token");

        let config = HrmConfig::from_toml_str(
            r#"
[backend]
token = "${HRM_TEST_TOKEN_A}"
"#,
        )
        .unwrap();
        assert_eq!(config.token(), Some("secret-token"));

        std::env::remove_var("HRM_TEST_TOKEN_A");

        let config = HrmConfig::from_toml_str(
            r#"
[backend]
token = "${HRM_TEST_TOKEN_UNSET}"
"#,
        )
        .unwrap();
        assert_eq!(config.token(), None);
    }

    #[test]
    fn test_config_validation() {
        let config = HrmConfig::from_toml_str(
            r#"
[backend]
mode = "rest"
base_url = "invalid-url"
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());

        let config = HrmConfig::from_toml_str("[logging]\nformat = \"xml\"\n").unwrap();
        assert!(config.validate().is_err());

        let config = HrmConfig::from_toml_str("[profile]\nautosave_seconds = 0\n").unwrap();
        assert!(config.validate().is_err());

        assert!(HrmConfig::from_toml_str("[backend]\nmode = \"soap\"\n").is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[storage]\ndata_dir = \"./demo-data\"\n")
            .unwrap();

        let config = HrmConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.storage.data_dir, "./demo-data");
    }
}
