//! Route guard
//!
//! Decides whether a role may open a shell route. In `Advisory` mode the menu
//! only controls which links are shown and every route stays reachable; in
//! `Enforced` mode shell routes must be listed in the caller's menu.

use super::menu::{is_within, menu_contains, normalize_path, SHELL_PREFIX};
use super::{GuardMode, Role};
use crate::{ClientError, ClientResult};
use tracing::{debug, warn};

/// Outcome of a route check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    /// Listed in the role's menu, or outside the shell entirely
    Granted,
    /// Not listed, but let through because the guard is advisory
    Unlisted,
    /// Not listed and the guard is enforced
    Forbidden,
    /// Shell route requested without a session under an enforced guard
    LoginRequired,
}

impl RouteAccess {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RouteAccess::Granted | RouteAccess::Unlisted)
    }
}

/// Role-keyed route guard
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteGuard {
    mode: GuardMode,
}

impl RouteGuard {
    pub fn new(mode: GuardMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> GuardMode {
        self.mode
    }

    /// Whether `path` is hosted inside the shell
    pub fn is_shell_route(path: &str) -> bool {
        is_within(SHELL_PREFIX, normalize_path(path))
    }

    /// Check `path` for the given role; `None` means no session.
    pub fn check(&self, role: Option<Role>, path: &str) -> RouteAccess {
        if !Self::is_shell_route(path) {
            return RouteAccess::Granted;
        }

        match self.mode {
            GuardMode::Advisory => {
                // Same fallback as the menu: no session browses as a student
                if menu_contains(role.unwrap_or_default(), path) {
                    RouteAccess::Granted
                } else {
                    RouteAccess::Unlisted
                }
            }
            GuardMode::Enforced => match role {
                None => RouteAccess::LoginRequired,
                Some(role) if menu_contains(role, path) => RouteAccess::Granted,
                Some(_) => RouteAccess::Forbidden,
            },
        }
    }

    /// Check and turn refusals into errors, logging what was let through.
    pub fn authorize(&self, role: Option<Role>, path: &str) -> ClientResult<()> {
        match self.check(role, path) {
            RouteAccess::Granted => {
                debug!(path, role = ?role, "Route granted");
                Ok(())
            }
            RouteAccess::Unlisted => {
                warn!(
                    path,
                    role = %role.unwrap_or_default(),
                    authenticated = role.is_some(),
                    "Opening a route outside the role's menu (advisory guard)"
                );
                Ok(())
            }
            RouteAccess::Forbidden => {
                let role = role.unwrap_or_default();
                warn!(path, role = %role, "Route refused");
                Err(ClientError::Forbidden {
                    path: path.to_string(),
                    role,
                })
            }
            RouteAccess::LoginRequired => {
                debug!(path, "Route requires a session");
                Err(ClientError::LoginRequired {
                    path: path.to_string(),
                })
            }
        }
    }
}
