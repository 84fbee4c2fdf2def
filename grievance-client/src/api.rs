//! Authentication endpoint client
//!
//! The endpoint is an external contract: JSON bodies with camelCase fields,
//! 2xx on success, and a `{ "message": ... }` body on failure.

use crate::session::SessionFields;
use crate::{ClientError, ClientResult};
use async_trait::async_trait;
use grievance_core::{ApiConfig, ErrorContext, GrievanceError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Login form
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub register_no: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(register_no: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            register_no: register_no.into(),
            password: password.into(),
        }
    }
}

/// Registration form
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub register_no: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub department: String,
    pub password: String,
    pub role: String,
}

/// User object returned by a successful login
pub type UserPayload = SessionFields;

#[derive(Debug, Deserialize)]
struct LoginResponse {
    user: Option<UserPayload>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// The authentication endpoint
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange credentials for the user object
    async fn login(&self, request: &LoginRequest) -> ClientResult<UserPayload>;

    /// Create an account; the response body is not used
    async fn register(&self, request: &RegisterRequest) -> ClientResult<()>;
}

/// `AuthApi` over HTTP
pub struct HttpAuthApi {
    client: reqwest::Client,
    base_url: url::Url,
    login_path: String,
    register_path: String,
}

impl HttpAuthApi {
    pub fn new(config: &ApiConfig) -> ClientResult<Self> {
        let mut base_url = url::Url::parse(&config.base_url).map_err(|e| GrievanceError::Config {
            message: format!("Invalid api.base_url '{}': {}", config.base_url, e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("auth_api").with_operation("new"),
        })?;

        // Endpoint paths are appended below the base path, never replace it
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        info!("Created auth API client for {}", base_url);

        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
            login_path: config.login_path.clone(),
            register_path: config.register_path.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> ClientResult<url::Url> {
        let relative = path.trim_start_matches('/');
        self.base_url.join(relative).map_err(|e| {
            ClientError::Core(GrievanceError::Config {
                message: format!("Invalid endpoint path '{}': {}", path, e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("auth_api").with_operation("endpoint"),
            })
        })
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        operation: &str,
    ) -> ClientResult<reqwest::Response> {
        let url = self.endpoint(path)?;
        debug!("POST {} ({})", url, operation);

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                warn!(operation, error = %e, "Request to auth endpoint failed");
                ClientError::transport(format!("{} request failed", operation), e)
            })?;

        if !response.status().is_success() {
            return Err(rejection(response, operation).await);
        }

        Ok(response)
    }
}

/// Turn a non-2xx response into a rejection carrying the server's message
async fn rejection(response: reqwest::Response, operation: &str) -> ClientError {
    let status = response.status();
    let message = match response.json::<ErrorBody>().await {
        Ok(ErrorBody {
            message: Some(message),
        }) if !message.trim().is_empty() => message,
        _ => status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16())),
    };

    info!(operation, status = status.as_u16(), message = %message, "Request rejected");
    ClientError::rejected(message)
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn login(&self, request: &LoginRequest) -> ClientResult<UserPayload> {
        let response = self.post(&self.login_path, request, "login").await?;

        let body: LoginResponse = response.json().await.map_err(|e| {
            warn!(error = %e, "Login response was not the expected JSON");
            ClientError::transport("Unreadable login response", e)
        })?;

        match body.user {
            Some(user) if !user.register_no.is_empty() => Ok(user),
            _ => Err(ClientError::rejected(
                body.message
                    .unwrap_or_else(|| "Login response did not include a user".to_string()),
            )),
        }
    }

    async fn register(&self, request: &RegisterRequest) -> ClientResult<()> {
        self.post(&self.register_path, request, "register").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_use_api_field_names() {
        let login = serde_json::to_value(LoginRequest::new("R1", "pw")).unwrap();
        assert_eq!(login, serde_json::json!({"registerNo": "R1", "password": "pw"}));

        let register = serde_json::to_value(RegisterRequest {
            register_no: "R2".into(),
            name: "B".into(),
            email: "b@uni.edu".into(),
            phone: "2".into(),
            department: "CSE".into(),
            password: "secret".into(),
            role: "student".into(),
        })
        .unwrap();
        assert_eq!(register["registerNo"], "R2");
        assert_eq!(register["department"], "CSE");
        assert_eq!(register.as_object().unwrap().len(), 7);
    }

    #[test]
    fn endpoints_join_onto_base_url() {
        let api = HttpAuthApi::new(&ApiConfig {
            base_url: "http://localhost:5000".to_string(),
            login_path: "/api/auth/login".to_string(),
            register_path: "/api/auth/register".to_string(),
        })
        .unwrap();
        assert_eq!(
            api.endpoint(&api.login_path).unwrap().as_str(),
            "http://localhost:5000/api/auth/login"
        );
    }

    #[test]
    fn endpoints_keep_the_base_path_prefix() {
        for base in ["http://host:5000/grievance", "http://host:5000/grievance/"] {
            let api = HttpAuthApi::new(&ApiConfig {
                base_url: base.to_string(),
                login_path: "/api/auth/login".to_string(),
                register_path: "api/auth/register".to_string(),
            })
            .unwrap();
            assert_eq!(
                api.endpoint(&api.login_path).unwrap().as_str(),
                "http://host:5000/grievance/api/auth/login"
            );
            assert_eq!(
                api.endpoint(&api.register_path).unwrap().as_str(),
                "http://host:5000/grievance/api/auth/register"
            );
        }
    }

    #[test]
    fn invalid_base_url_is_a_config_error() {
        let result = HttpAuthApi::new(&ApiConfig {
            base_url: "::nope".to_string(),
            login_path: "/login".to_string(),
            register_path: "/register".to_string(),
        });
        assert!(matches!(
            result,
            Err(ClientError::Core(GrievanceError::Config { .. }))
        ));
    }
}
