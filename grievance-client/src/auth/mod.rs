//! Role-based navigation
//!
//! Roles, the static role-to-menu table and the route guard built on top of it.

pub mod guard;
pub mod menu;
pub mod role;

pub use grievance_core::GuardMode;
pub use guard::{RouteAccess, RouteGuard};
pub use menu::{
    find_item, menu_contains, menu_items, resolve_menu, resolve_menu_for, MenuItem, MenuSection,
    SHELL_PREFIX,
};
pub use role::Role;
