//! Shell - the persistent navigation frame around feature screens
//!
//! The role is read once at mount. Logging in as someone else in the same tab
//! does not change an already mounted shell; remount to pick it up.
//!
//! The mounted path goes through the route guard like any other navigation:
//! a refused route lands on the dashboard, a missing session on the entry
//! route.

use crate::auth::{find_item, resolve_menu, MenuItem, MenuSection, Role, RouteGuard};
use crate::flow::end_session;
use crate::navigation::Navigator;
use crate::scope::MountScope;
use crate::session::SessionStore;
use crate::{ClientError, ClientResult};
use grievance_core::ShellConfig;
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::{debug, info};

/// Scroll callback for the main content viewport
pub type ScrollListener = Box<dyn Fn(u32) + Send + Sync>;

/// What a feature screen gets to know about the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenContext {
    pub role: Role,
    /// `None` when the shell was mounted without a session
    pub register_no: Option<String>,
}

pub struct Shell {
    store: SessionStore,
    navigator: Arc<dyn Navigator>,
    guard: RouteGuard,
    entry_route: String,
    dashboard_route: String,
    role: Role,
    authenticated: bool,
    register_no: Option<String>,
    menu: &'static [MenuSection],
    current_path: String,
    scroll_listener: Option<ScrollListener>,
    scope: MountScope,
}

impl std::fmt::Debug for Shell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shell")
            .field("role", &self.role)
            .field("authenticated", &self.authenticated)
            .field("current_path", &self.current_path)
            .field("guard", &self.guard)
            .finish()
    }
}

impl Shell {
    /// Mount the shell on `current_path`, reading the session once.
    ///
    /// When the guard refuses `current_path` the shell mounts on the
    /// dashboard (or the entry route without a session) instead.
    pub fn mount(
        store: SessionStore,
        navigator: Arc<dyn Navigator>,
        config: &ShellConfig,
        current_path: &str,
    ) -> Self {
        let session = store.get();
        let role = session.as_ref().map(|s| s.role).unwrap_or_default();
        let menu = resolve_menu(role);

        info!(
            role = %role,
            authenticated = session.is_some(),
            path = current_path,
            "Shell mounted"
        );

        let mut shell = Self {
            store,
            navigator,
            guard: RouteGuard::new(config.guard_mode),
            entry_route: config.entry_route.clone(),
            dashboard_route: config.dashboard_route.clone(),
            role,
            authenticated: session.is_some(),
            register_no: session.map(|s| s.register_no),
            menu,
            current_path: current_path.to_string(),
            scroll_listener: None,
            scope: MountScope::new(),
        };

        match shell.authorize_current() {
            Ok(()) => {}
            Err(ClientError::LoginRequired { .. }) => {
                let entry = shell.entry_route.clone();
                shell.redirect(&entry);
            }
            Err(ClientError::Forbidden { .. }) => {
                let dashboard = shell.dashboard_route.clone();
                shell.redirect(&dashboard);
            }
            Err(e) => debug!(error = %e, "Unexpected guard failure at mount"),
        }

        shell
    }

    /// Attach a scroll listener to the content viewport
    pub fn with_scroll_listener(mut self, listener: ScrollListener) -> Self {
        self.scroll_listener = Some(listener);
        self
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn menu(&self) -> &'static [MenuSection] {
        self.menu
    }

    pub fn current_path(&self) -> &str {
        &self.current_path
    }

    pub fn guard(&self) -> &RouteGuard {
        &self.guard
    }

    /// Menu entry to highlight for the current path
    pub fn active_item(&self) -> Option<&'static MenuItem> {
        find_item(self.role, &self.current_path)
    }

    pub fn screen_context(&self) -> ScreenContext {
        ScreenContext {
            role: self.role,
            register_no: self.register_no.clone(),
        }
    }

    /// Scope that owns fetches started by the hosted screen
    pub fn scope(&self) -> &MountScope {
        &self.scope
    }

    /// Check whether the current path may be shown to this role
    pub fn authorize_current(&self) -> ClientResult<()> {
        self.guard
            .authorize(self.session_role(), &self.current_path)
    }

    /// Move to another route.
    ///
    /// The previous screen's scope is closed so its pending fetches are dropped.
    pub fn navigate(&mut self, path: &str) -> ClientResult<()> {
        if let Err(e) = self.guard.authorize(self.session_role(), path) {
            if matches!(e, ClientError::LoginRequired { .. }) {
                let entry = self.entry_route.clone();
                self.redirect(&entry);
            }
            return Err(e);
        }

        self.redirect(path);
        Ok(())
    }

    /// Leave the current screen for `path` without consulting the guard
    fn redirect(&mut self, path: &str) {
        self.scope.close();
        self.scope = MountScope::new();
        self.current_path = path.to_string();
        self.navigator.navigate(path);
    }

    /// Feed a scroll offset to the registered listener, if any
    pub fn on_scroll(&self, offset: u32) {
        if let Some(listener) = &self.scroll_listener {
            listener(offset);
        }
    }

    /// Clear the session and go to the entry point
    pub fn logout(self) -> ClientResult<()> {
        end_session(&self.store, self.navigator.as_ref(), &self.entry_route)
    }

    /// Plain-text navigation with the active entry marked
    pub fn render_menu(&self) -> String {
        let active = self.active_item().map(|item| item.path);
        let mut out = String::new();

        for section in self.menu {
            let _ = writeln!(out, "{}", section.group);
            for item in section.items {
                let marker = if Some(item.path) == active { '>' } else { ' ' };
                let _ = writeln!(out, "  {} {:<22} {}", marker, item.name, item.path);
            }
        }
        out
    }

    fn session_role(&self) -> Option<Role> {
        self.authenticated.then_some(self.role)
    }
}

impl Drop for Shell {
    fn drop(&mut self) {
        if self.scroll_listener.take().is_some() {
            debug!("Scroll listener removed");
        }
        self.scope.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::HistoryNavigator;
    use crate::session::SessionFields;
    use grievance_core::{ClientConfig, GuardMode};
    use std::sync::atomic::{AtomicU32, Ordering};

    fn store_with(role: &str) -> SessionStore {
        let store = SessionStore::in_memory();
        store
            .set_session(&SessionFields::new("N", "0", role, "R-1"))
            .unwrap();
        store
    }

    fn config(mode: GuardMode) -> ShellConfig {
        let mut config = ClientConfig::default().shell;
        config.guard_mode = mode;
        config
    }

    #[test]
    fn mount_resolves_menu_for_stored_role() {
        let shell = Shell::mount(
            store_with("admin"),
            Arc::new(HistoryNavigator::new()),
            &config(GuardMode::Enforced),
            "/portal/userManagement",
        );
        assert_eq!(shell.role(), Role::Admin);
        assert_eq!(shell.menu()[0].group, "System Administration");
        assert_eq!(shell.active_item().map(|i| i.name), Some("User Management"));
        assert_eq!(
            shell.screen_context(),
            ScreenContext {
                role: Role::Admin,
                register_no: Some("R-1".to_string())
            }
        );
    }

    #[test]
    fn role_is_read_once_per_mount() {
        let store = store_with("staff");
        let shell = Shell::mount(
            store.clone(),
            Arc::new(HistoryNavigator::new()),
            &config(GuardMode::Enforced),
            "/portal/dashboard",
        );
        store
            .set_session(&SessionFields::new("N", "0", "admin", "R-2"))
            .unwrap();
        assert_eq!(shell.role(), Role::Staff);
    }

    #[test]
    fn enforced_navigation_refuses_other_roles_screens() {
        let navigator = Arc::new(HistoryNavigator::new());
        let mut shell = Shell::mount(
            store_with("student"),
            navigator.clone(),
            &config(GuardMode::Enforced),
            "/portal/dashboard",
        );

        shell.navigate("/portal/my-complaints").unwrap();
        assert!(matches!(
            shell.navigate("/portal/userManagement"),
            Err(ClientError::Forbidden { .. })
        ));
        assert_eq!(shell.current_path(), "/portal/my-complaints");
        assert_eq!(navigator.history(), vec!["/portal/my-complaints"]);
    }

    #[test]
    fn advisory_navigation_lets_anything_through() {
        let mut shell = Shell::mount(
            store_with("student"),
            Arc::new(HistoryNavigator::new()),
            &config(GuardMode::Advisory),
            "/portal/dashboard",
        );
        shell.navigate("/portal/userManagement").unwrap();
        assert_eq!(shell.active_item(), None);
    }

    #[test]
    fn anonymous_visitor_is_sent_to_entry_under_enforced_guard() {
        let navigator = Arc::new(HistoryNavigator::new());
        let mut shell = Shell::mount(
            SessionStore::in_memory(),
            navigator.clone(),
            &config(GuardMode::Enforced),
            "/",
        );
        assert_eq!(shell.role(), Role::Student);
        assert!(matches!(
            shell.navigate("/portal/dashboard"),
            Err(ClientError::LoginRequired { .. })
        ));
        assert_eq!(navigator.current().as_deref(), Some("/"));
        assert_eq!(shell.current_path(), "/");
    }

    #[tokio::test]
    async fn login_redirect_leaves_the_previous_screen() {
        let navigator = Arc::new(HistoryNavigator::new());
        let mut shell = Shell::mount(
            SessionStore::in_memory(),
            navigator.clone(),
            &config(GuardMode::Enforced),
            "/about",
        );
        assert_eq!(shell.current_path(), "/about");
        let fetch = shell.scope().spawn(async {
            tokio::time::sleep(std::time::Duration::from_secs(60)).await;
        });

        assert!(matches!(
            shell.navigate("/portal/profile"),
            Err(ClientError::LoginRequired { .. })
        ));
        assert_eq!(shell.current_path(), "/");
        assert_eq!(navigator.current().as_deref(), Some("/"));
        assert_eq!(fetch.join().await, None);
    }

    #[test]
    fn student_mounted_on_admin_route_lands_on_dashboard() {
        let navigator = Arc::new(HistoryNavigator::new());
        let shell = Shell::mount(
            store_with("student"),
            navigator.clone(),
            &config(GuardMode::Enforced),
            "/portal/userManagement",
        );

        assert_eq!(shell.current_path(), "/portal/dashboard");
        assert_eq!(shell.active_item().map(|i| i.name), Some("Dashboard"));
        assert!(!shell.render_menu().contains("User Management"));
        assert!(shell.authorize_current().is_ok());
        assert_eq!(navigator.current().as_deref(), Some("/portal/dashboard"));
    }

    #[test]
    fn mounting_a_shell_route_without_session_goes_to_entry() {
        let navigator = Arc::new(HistoryNavigator::new());
        let shell = Shell::mount(
            SessionStore::in_memory(),
            navigator.clone(),
            &config(GuardMode::Enforced),
            "/portal/my-complaints",
        );
        assert_eq!(shell.current_path(), "/");
        assert_eq!(shell.active_item(), None);
        assert_eq!(navigator.history(), vec!["/"]);
    }

    #[test]
    fn advisory_mount_keeps_unlisted_route() {
        let navigator = Arc::new(HistoryNavigator::new());
        let shell = Shell::mount(
            store_with("student"),
            navigator.clone(),
            &config(GuardMode::Advisory),
            "/portal/userManagement",
        );
        assert_eq!(shell.current_path(), "/portal/userManagement");
        assert!(navigator.history().is_empty());
    }

    #[test]
    fn logout_clears_session_and_navigates_to_entry() {
        for role in ["student", "staff", "admin"] {
            let store = store_with(role);
            let navigator = Arc::new(HistoryNavigator::new());
            let shell = Shell::mount(
                store.clone(),
                navigator.clone(),
                &config(GuardMode::Enforced),
                "/portal/profile",
            );
            shell.logout().unwrap();

            assert!(!store.is_authenticated());
            assert_eq!(store.name(), None);
            assert_eq!(store.phone(), None);
            assert_eq!(store.raw_role(), None);
            assert_eq!(navigator.current().as_deref(), Some("/"));
        }
    }

    #[test]
    fn scroll_listener_receives_offsets() {
        let seen = Arc::new(AtomicU32::new(0));
        let sink = Arc::clone(&seen);
        let shell = Shell::mount(
            store_with("staff"),
            Arc::new(HistoryNavigator::new()),
            &config(GuardMode::Enforced),
            "/portal/dashboard",
        )
        .with_scroll_listener(Box::new(move |offset| sink.store(offset, Ordering::SeqCst)));

        shell.on_scroll(120);
        assert_eq!(seen.load(Ordering::SeqCst), 120);
    }

    #[test]
    fn render_marks_the_active_entry() {
        let shell = Shell::mount(
            store_with("student"),
            Arc::new(HistoryNavigator::new()),
            &config(GuardMode::Enforced),
            "/portal/raise-complaint",
        );
        let rendered = shell.render_menu();
        assert!(rendered.starts_with("Student Services\n"));
        assert!(rendered.contains("> Raise Complaint"));
        assert!(rendered.contains("  Dashboard"));
    }

    #[tokio::test]
    async fn navigating_away_cancels_screen_fetches() {
        let mut shell = Shell::mount(
            store_with("staff"),
            Arc::new(HistoryNavigator::new()),
            &config(GuardMode::Enforced),
            "/portal/assigned-complaints",
        );
        let fetch = shell.scope().spawn(async {
            tokio::time::sleep(std::time::Duration::from_secs(60)).await;
            vec!["complaint"]
        });

        shell.navigate("/portal/profile").unwrap();
        assert_eq!(fetch.join().await, None);
    }
}
