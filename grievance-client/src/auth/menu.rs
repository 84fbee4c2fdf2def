//! Role-to-menu resolver
//!
//! Each role gets a fixed, ordered list of sections. The table is static and
//! never mutated; order is rendering order.

use super::Role;
use serde::Serialize;

/// Prefix shared by every route hosted inside the shell
pub const SHELL_PREFIX: &str = "/portal";

/// A single navigation entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub name: &'static str,
    pub path: &'static str,
    pub icon: &'static str,
}

/// A labelled group of navigation entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MenuSection {
    pub group: &'static str,
    pub items: &'static [MenuItem],
}

const DASHBOARD: MenuItem = MenuItem {
    name: "Dashboard",
    path: "/portal/dashboard",
    icon: "dashboard",
};

const PROFILE: MenuItem = MenuItem {
    name: "Profile",
    path: "/portal/profile",
    icon: "person",
};

const ACCOUNT: MenuSection = MenuSection {
    group: "Account",
    items: &[PROFILE],
};

const STUDENT_MENU: &[MenuSection] = &[
    MenuSection {
        group: "Student Services",
        items: &[
            DASHBOARD,
            MenuItem {
                name: "Raise Complaint",
                path: "/portal/raise-complaint",
                icon: "add_circle",
            },
            MenuItem {
                name: "My Complaints",
                path: "/portal/my-complaints",
                icon: "list_alt",
            },
            MenuItem {
                name: "Track Complaint",
                path: "/portal/track-complaint",
                icon: "track_changes",
            },
        ],
    },
    ACCOUNT,
];

const STAFF_MENU: &[MenuSection] = &[
    MenuSection {
        group: "Staff Workspace",
        items: &[
            DASHBOARD,
            MenuItem {
                name: "Assigned Complaints",
                path: "/portal/assigned-complaints",
                icon: "assignment_ind",
            },
            MenuItem {
                name: "Resolved Complaints",
                path: "/portal/resolved-complaints",
                icon: "task_alt",
            },
        ],
    },
    ACCOUNT,
];

const ADMIN_MENU: &[MenuSection] = &[
    MenuSection {
        group: "System Administration",
        items: &[
            DASHBOARD,
            MenuItem {
                name: "User Management",
                path: "/portal/userManagement",
                icon: "manage_accounts",
            },
            MenuItem {
                name: "Departments",
                path: "/portal/departments",
                icon: "apartment",
            },
            MenuItem {
                name: "Categories",
                path: "/portal/categories",
                icon: "category",
            },
        ],
    },
    MenuSection {
        group: "Complaint Oversight",
        items: &[
            MenuItem {
                name: "All Complaints",
                path: "/portal/all-complaints",
                icon: "inbox",
            },
            MenuItem {
                name: "Assign Complaints",
                path: "/portal/assign-complaints",
                icon: "assignment",
            },
            MenuItem {
                name: "Reports",
                path: "/portal/reports",
                icon: "bar_chart",
            },
        ],
    },
    ACCOUNT,
];

/// Resolve the navigation menu for a role
pub fn resolve_menu(role: Role) -> &'static [MenuSection] {
    match role {
        Role::Student => STUDENT_MENU,
        Role::Staff => STAFF_MENU,
        Role::Admin => ADMIN_MENU,
    }
}

/// Resolve the menu for a raw, possibly absent role string.
///
/// Anything that is not a known role gets the student menu.
pub fn resolve_menu_for(role: Option<&str>) -> &'static [MenuSection] {
    resolve_menu(Role::from_stored(role))
}

/// Iterate every item of a menu in rendering order
pub fn menu_items(menu: &'static [MenuSection]) -> impl Iterator<Item = &'static MenuItem> {
    menu.iter().flat_map(|section| section.items.iter())
}

/// Whether `path` is listed anywhere in the role's menu
pub fn menu_contains(role: Role, path: &str) -> bool {
    find_item(role, path).is_some()
}

/// Find the menu entry responsible for `path`.
///
/// An exact match wins; otherwise the entry whose path is the longest
/// `/`-bounded prefix of `path` (so `/portal/my-complaints/42` belongs to
/// My Complaints).
pub fn find_item(role: Role, path: &str) -> Option<&'static MenuItem> {
    let path = normalize_path(path);
    menu_items(resolve_menu(role))
        .filter(|item| is_within(item.path, path))
        .max_by_key(|item| item.path.len())
}

/// Whether `path` equals `base` or is nested below it
pub(crate) fn is_within(base: &str, path: &str) -> bool {
    match path.strip_prefix(base) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Drop query string, fragment and trailing slash
pub(crate) fn normalize_path(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let path = &path[..end];
    if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    }
}
