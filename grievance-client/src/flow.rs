//! Authentication flow
//!
//! Login: `Anonymous -> Authenticating -> Authenticated`, falling back to
//! `Anonymous` on rejection or transport failure. Logout: `Authenticated ->
//! Anonymous`. Registration runs beside it (`Anonymous -> Registering ->
//! Anonymous`) and never touches the session.
//!
//! Each submit issues exactly one request; there are no retries, timeouts or
//! cancellation on this path.

use crate::api::{AuthApi, LoginRequest, RegisterRequest};
use crate::auth::Role;
use crate::navigation::Navigator;
use crate::session::{Session, SessionStore};
use crate::{ClientError, ClientResult};
use grievance_core::{
    log_operation_error, log_operation_start, log_operation_success, ErrorContext,
    GrievanceError, ShellConfig,
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

/// Where the authentication state machine currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    Authenticating,
    Registering,
    Authenticated,
}

impl AuthState {
    /// Whether a request is in flight (submit controls are disabled)
    pub fn is_busy(&self) -> bool {
        matches!(self, AuthState::Authenticating | AuthState::Registering)
    }
}

/// Which form the unauthenticated entry point shows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthView {
    #[default]
    Login,
    Register,
}

/// Login, registration and logout for one tab
pub struct AuthFlow {
    api: Arc<dyn AuthApi>,
    store: SessionStore,
    navigator: Arc<dyn Navigator>,
    entry_route: String,
    dashboard_route: String,
    view: AuthView,
    state: watch::Sender<AuthState>,
}

impl AuthFlow {
    /// Create a flow; starts `Authenticated` when the tab already holds a session
    pub fn new(
        api: Arc<dyn AuthApi>,
        store: SessionStore,
        navigator: Arc<dyn Navigator>,
        shell: &ShellConfig,
    ) -> Self {
        let initial = if store.is_authenticated() {
            AuthState::Authenticated
        } else {
            AuthState::Anonymous
        };
        let (state, _) = watch::channel(initial);

        Self {
            api,
            store,
            navigator,
            entry_route: shell.entry_route.clone(),
            dashboard_route: shell.dashboard_route.clone(),
            view: AuthView::Login,
            state,
        }
    }

    pub fn state(&self) -> AuthState {
        *self.state.borrow()
    }

    /// Watch state changes, e.g. to disable a submit button while busy
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn can_submit(&self) -> bool {
        !self.state().is_busy()
    }

    pub fn view(&self) -> AuthView {
        self.view
    }

    pub fn show_register(&mut self) {
        self.view = AuthView::Register;
    }

    pub fn show_login(&mut self) {
        self.view = AuthView::Login;
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    fn set_state(&self, state: AuthState) {
        self.state.send_replace(state);
    }

    /// Submit login credentials.
    ///
    /// On success the session is stored and the user is sent to the dashboard.
    /// On any failure the session store is left exactly as it was.
    pub async fn login(&mut self, request: LoginRequest) -> ClientResult<Session> {
        validate_login(&request)?;

        log_operation_start!("login", register_no = %request.register_no);
        let previous = self.state();
        self.set_state(AuthState::Authenticating);

        let user = match self.api.login(&request).await {
            Ok(user) => user,
            Err(e) => {
                log_operation_error!("login", e, register_no = %request.register_no);
                self.set_state(if previous == AuthState::Authenticated {
                    previous
                } else {
                    AuthState::Anonymous
                });
                return Err(e);
            }
        };

        if let Err(e) = self.store.set_session(&user) {
            log_operation_error!("store_session", e);
            self.set_state(AuthState::Anonymous);
            return Err(e);
        }

        let session = self.store.get().ok_or_else(|| {
            self.set_state(AuthState::Anonymous);
            ClientError::Core(GrievanceError::Internal {
                message: "Session was not readable after login".to_string(),
                source: None,
                context: ErrorContext::new("auth_flow").with_operation("login"),
            })
        })?;

        self.set_state(AuthState::Authenticated);
        self.view = AuthView::Login;
        self.navigator.navigate(&self.dashboard_route);

        log_operation_success!("login",
            register_no = %session.register_no,
            role = %session.role
        );
        Ok(session)
    }

    /// Submit the registration form.
    ///
    /// On success the entry point switches back to the login form.
    pub async fn register(&mut self, request: RegisterRequest) -> ClientResult<()> {
        validate_registration(&request)?;

        log_operation_start!("register", register_no = %request.register_no);
        let previous = self.state();
        self.set_state(AuthState::Registering);

        let result = self.api.register(&request).await;
        self.set_state(previous);

        match result {
            Ok(()) => {
                self.view = AuthView::Login;
                log_operation_success!("register", register_no = %request.register_no);
                Ok(())
            }
            Err(e) => {
                log_operation_error!("register", e, register_no = %request.register_no);
                Err(e)
            }
        }
    }

    /// Clear the session and return to the entry point
    pub fn logout(&mut self) -> ClientResult<()> {
        end_session(&self.store, self.navigator.as_ref(), &self.entry_route)?;
        self.set_state(AuthState::Anonymous);
        self.view = AuthView::Login;
        Ok(())
    }
}

/// Clear the session and navigate to `entry_route`.
///
/// Shared by the flow and the shell's logout action.
pub(crate) fn end_session(
    store: &SessionStore,
    navigator: &dyn Navigator,
    entry_route: &str,
) -> ClientResult<()> {
    let who = store.register_no();
    store.clear()?;
    navigator.navigate(entry_route);
    info!(register_no = ?who, "Logged out");
    Ok(())
}

fn require(field: &str, label: &str, value: &str) -> ClientResult<()> {
    if value.trim().is_empty() {
        warn!(field, "Required field missing");
        return Err(ClientError::validation(
            field,
            format!("{} is required", label),
        ));
    }
    Ok(())
}

/// Required-field check run before any login request
pub fn validate_login(request: &LoginRequest) -> ClientResult<()> {
    require("registerNo", "Register number", &request.register_no)?;
    require("password", "Password", &request.password)
}

/// Required-field check run before any registration request
pub fn validate_registration(request: &RegisterRequest) -> ClientResult<()> {
    require("registerNo", "Register number", &request.register_no)?;
    require("name", "Name", &request.name)?;
    require("email", "Email", &request.email)?;
    require("phone", "Phone", &request.phone)?;
    require("department", "Department", &request.department)?;
    require("password", "Password", &request.password)?;
    require("role", "Role", &request.role)?;

    if request.role.parse::<Role>().is_err() {
        return Err(ClientError::validation(
            "role",
            format!("Unknown role '{}'", request.role),
        ));
    }
    Ok(())
}
