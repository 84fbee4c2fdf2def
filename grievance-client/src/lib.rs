//! Grievance Client - session and navigation model for the grievance portal
//!
//! The portal is a set of role-scoped screens (student, staff, admin) on top of
//! an external REST API. This crate holds the part that decides who is logged in
//! and what they may reach:
//!
//! - **Session**: the tab-scoped identity written at login and cleared at logout
//! - **Auth**: roles, the role-to-menu resolver and the route guard
//! - **Flow**: the login / registration / logout state machine
//! - **Shell**: the navigation frame hosting feature screens
//!
//! Feature screens themselves (complaints, users, departments, categories) live
//! outside this crate and only consume a [`shell::ScreenContext`].

pub mod api;
pub mod auth;
pub mod flow;
pub mod navigation;
pub mod scope;
pub mod session;
pub mod shell;

pub use api::{AuthApi, HttpAuthApi, LoginRequest, RegisterRequest, UserPayload};
pub use auth::{resolve_menu, GuardMode, MenuItem, MenuSection, Role, RouteAccess, RouteGuard};
pub use flow::{AuthFlow, AuthState, AuthView};
pub use navigation::{HistoryNavigator, Navigator};
pub use scope::{MountScope, ScreenTask};
pub use session::{
    FileTabStorage, MemoryTabStorage, Session, SessionFields, SessionStore, TabStorage,
};
pub use shell::{ScreenContext, Shell};

use grievance_core::{storage_error, validation_error, ErrorContext, GrievanceError};

/// Message shown for any transport failure; the cause is only logged.
pub const GENERIC_SERVER_ERROR: &str = "Server error. Please try again later.";

/// Client-level error type.
///
/// Storage, transport, rejection and validation failures are carried as
/// [`GrievanceError`] variants; only route refusals are specific to the client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Core(#[from] GrievanceError),

    #[error("Role '{role}' may not open {path}")]
    Forbidden { path: String, role: Role },

    #[error("Login required to open {path}")]
    LoginRequired { path: String },
}

pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// Create a validation error for a form field
    pub fn validation<F: Into<String>, S: Into<String>>(field: F, message: S) -> Self {
        let field: String = field.into();
        let message: String = message.into();
        Self::Core(validation_error!(message, field, "form"))
    }

    /// Create a rejection carrying the server's message
    pub fn rejected<S: Into<String>>(message: S) -> Self {
        Self::Core(GrievanceError::Authentication {
            message: message.into(),
            context: ErrorContext::new("auth_api"),
        })
    }

    /// Create a transport failure; `source` is kept for logs only
    pub fn transport<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Core(GrievanceError::Network {
            message: message.into(),
            source: Some(Box::new(source)),
            context: ErrorContext::new("auth_api")
                .with_suggestion("Check that the grievance API is reachable"),
        })
    }

    /// Create a storage error
    pub fn storage<S: Into<String>>(message: S) -> Self {
        let message: String = message.into();
        Self::Core(storage_error!(message, "tab_storage"))
    }

    /// Whether the request never got an answer from the server
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Core(GrievanceError::Network { .. }))
    }

    /// Whether the server answered with a refusal
    pub fn is_rejected(&self) -> bool {
        matches!(self, ClientError::Core(GrievanceError::Authentication { .. }))
    }

    /// Form field a validation error refers to
    pub fn field(&self) -> Option<&str> {
        match self {
            ClientError::Core(GrievanceError::Validation { field, .. }) => field.as_deref(),
            _ => None,
        }
    }

    /// Text to put in front of the user.
    ///
    /// Server rejections are passed through verbatim; transport failures all
    /// collapse into [`GENERIC_SERVER_ERROR`].
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Core(GrievanceError::Validation { message, .. })
            | ClientError::Core(GrievanceError::Authentication { message, .. }) => {
                message.clone()
            }
            ClientError::Core(GrievanceError::Network { .. }) => GENERIC_SERVER_ERROR.to_string(),
            ClientError::Forbidden { .. } => {
                "You do not have access to this page.".to_string()
            }
            ClientError::LoginRequired { .. } => "Please log in to continue.".to_string(),
            other => other.to_string(),
        }
    }
}
