//! Role-aware navigation menu.

use crate::routes::{ADMIN_LANDING, LOGISTIK_LANDING, USER_LANDING};
use crate::AccessPolicy;
use inventory_types::Role;
use serde::Serialize;

/// One menu entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavEntry {
    pub label: &'static str,
    pub path: &'static str,
    /// Shown only to roles on the privileged allow-list.
    pub privileged: bool,
}

const fn entry(label: &'static str, path: &'static str) -> NavEntry {
    NavEntry {
        label,
        path,
        privileged: false,
    }
}

const fn privileged(label: &'static str, path: &'static str) -> NavEntry {
    NavEntry {
        label,
        path,
        privileged: true,
    }
}

const ADMIN_MENU: &[NavEntry] = &[
    entry("Dashboard", ADMIN_LANDING),
    entry("Assets", "/assets"),
    entry("Usage logs", "/usage-logs"),
    entry("Transfers", "/transfers"),
    entry("Stock opname", "/stock-opname"),
    entry("Reports", "/reports"),
    privileged("Labs", "/labs"),
    privileged("Users", "/users"),
];

const LOGISTIK_MENU: &[NavEntry] = &[
    entry("Dashboard", LOGISTIK_LANDING),
    entry("Transfers", "/logistik/transfers"),
    entry("Stock opname", "/logistik/stock-opname"),
    entry("Profile", "/profile"),
];

const USER_MENU: &[NavEntry] = &[
    entry("Dashboard", USER_LANDING),
    entry("Usage logs", "/user/usage-logs"),
    entry("Profile", "/profile"),
];

/// Ordered menu for `role`, with privileged entries filtered by `policy`.
pub fn navigation_for(role: &Role, policy: &AccessPolicy) -> Vec<NavEntry> {
    let menu = if role.is_admin_like() {
        ADMIN_MENU
    } else if *role == Role::Logistik {
        LOGISTIK_MENU
    } else {
        USER_MENU
    };

    let show_privileged = policy.is_privileged(role);
    menu.iter()
        .filter(|entry| !entry.privileged || show_privileged)
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::GuardDecision;
    use inventory_types::{SessionStatus, User};

    fn paths(entries: &[NavEntry]) -> Vec<&'static str> {
        entries.iter().map(|e| e.path).collect()
    }

    #[test]
    fn test_superadmin_sees_privileged_entries() {
        let menu = navigation_for(&Role::Superadmin, &AccessPolicy::default());
        assert_eq!(menu.len(), 8);
        assert_eq!(menu[0].label, "Dashboard");
        assert!(paths(&menu).ends_with(&["/labs", "/users"]));
    }

    #[test]
    fn test_admin_without_privilege_misses_them() {
        let menu = navigation_for(&Role::Admin, &AccessPolicy::default());
        assert_eq!(
            paths(&menu),
            vec![
                "/dashboard",
                "/assets",
                "/usage-logs",
                "/transfers",
                "/stock-opname",
                "/reports"
            ]
        );

        let widened = AccessPolicy::new(["superadmin", "admin"]);
        assert_eq!(navigation_for(&Role::Admin, &widened).len(), 8);
    }

    #[test]
    fn test_logistik_and_user_menus() {
        let policy = AccessPolicy::default();
        assert_eq!(
            paths(&navigation_for(&Role::Logistik, &policy)),
            vec![
                "/logistik/dashboard",
                "/logistik/transfers",
                "/logistik/stock-opname",
                "/profile"
            ]
        );
        assert_eq!(
            paths(&navigation_for(&Role::User, &policy)),
            vec!["/user/dashboard", "/user/usage-logs", "/profile"]
        );
        assert_eq!(
            navigation_for(&Role::Other("kaprodi".into()), &policy),
            navigation_for(&Role::User, &policy)
        );
    }

    #[test]
    fn test_every_entry_is_reachable_for_its_role() {
        let policies = [AccessPolicy::default(), AccessPolicy::new(["admin", "admin_lab"])];
        let roles = ["superadmin", "admin", "admin_lab", "logistik", "user"];

        for policy in &policies {
            for role in roles {
                let user: User = serde_json::from_value(
                    serde_json::json!({ "id": 1, "email": "a@x.com", "role": role }),
                )
                .unwrap();
                for entry in navigation_for(&user.role(), policy) {
                    assert_eq!(
                        policy.guard(SessionStatus::Authenticated, Some(&user), entry.path),
                        GuardDecision::Render,
                        "{} cannot open {}",
                        role,
                        entry.path
                    );
                }
            }
        }
    }
}
