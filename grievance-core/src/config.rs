//! Configuration management

use crate::error::{ErrorContext, GrievanceError, GrievanceResult};
use crate::types::{ApiConfig, ClientConfig, GuardMode, ShellConfig, StorageConfig};

use std::path::Path;

/// Overrides `api.base_url`
pub const ENV_API_URL: &str = "GRIEVANCE_API_URL";
/// Overrides `shell.guard_mode`
pub const ENV_GUARD_MODE: &str = "GRIEVANCE_GUARD_MODE";

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://localhost:5000".to_string(),
                login_path: "/api/auth/login".to_string(),
                register_path: "/api/auth/register".to_string(),
            },
            shell: ShellConfig {
                entry_route: "/".to_string(),
                dashboard_route: "/portal/dashboard".to_string(),
                guard_mode: GuardMode::Enforced,
            },
            storage: StorageConfig {
                session_dir: std::env::temp_dir()
                    .join("grievance")
                    .join("sessions")
                    .to_string_lossy()
                    .into_owned(),
            },
        }
    }
}

impl ClientConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> GrievanceResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| GrievanceError::Config {
            message: format!("Failed to read config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("read_file")
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        let config: ClientConfig = toml::from_str(&content).map_err(|e| GrievanceError::Config {
            message: format!("Failed to parse config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("parse_toml")
                .with_suggestion("Check TOML syntax in config file"),
        })?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> GrievanceResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| GrievanceError::Config {
            message: format!("Failed to serialize config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config").with_operation("serialize_toml"),
        })?;

        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        std::fs::write(path, content).map_err(|e| GrievanceError::Config {
            message: format!("Failed to write config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("write_file")
                .with_suggestion("Check if the directory exists and is writable"),
        })?;

        Ok(())
    }

    /// Apply environment overrides on top of file values
    pub fn apply_env(mut self) -> GrievanceResult<Self> {
        if let Ok(url) = std::env::var(ENV_API_URL) {
            self.api.base_url = url;
        }

        if let Ok(mode) = std::env::var(ENV_GUARD_MODE) {
            self.shell.guard_mode = mode.parse().map_err(|e: String| GrievanceError::Config {
                message: e,
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("apply_env")
                    .with_metadata("variable", ENV_GUARD_MODE)
                    .with_suggestion("Use 'advisory' or 'enforced'"),
            })?;
        }

        Ok(self)
    }

    /// Validate configuration
    pub fn validate(&self) -> GrievanceResult<()> {
        url::Url::parse(&self.api.base_url).map_err(|e| GrievanceError::Config {
            message: format!("Invalid api.base_url '{}': {}", self.api.base_url, e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("validate")
                .with_suggestion("Use an absolute URL such as http://localhost:5000"),
        })?;

        let routes = [
            ("api.login_path", &self.api.login_path),
            ("api.register_path", &self.api.register_path),
            ("shell.entry_route", &self.shell.entry_route),
            ("shell.dashboard_route", &self.shell.dashboard_route),
        ];
        for (key, value) in routes {
            if !value.starts_with('/') {
                return Err(GrievanceError::Config {
                    message: format!("{} must start with '/', got '{}'", key, value),
                    source: None,
                    context: ErrorContext::new("config")
                        .with_operation("validate")
                        .with_metadata("key", key),
                });
            }
        }

        if self.storage.session_dir.trim().is_empty() {
            return Err(GrievanceError::Config {
                message: "storage.session_dir must not be empty".to_string(),
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Point storage.session_dir at a writable directory"),
            });
        }

        Ok(())
    }
}
