//! Privileged role allow-list.

use inventory_types::Role;

/// Roles allowed on privileged routes when nothing is configured.
pub const DEFAULT_PRIVILEGED_ROLES: &[Role] = &[Role::Superadmin];

/// Access policy shared by the guard and the navigation builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    privileged_roles: Vec<Role>,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self {
            privileged_roles: DEFAULT_PRIVILEGED_ROLES.to_vec(),
        }
    }
}

impl AccessPolicy {
    /// Policy with the given privileged role names. Blank names are skipped.
    pub fn new<I, S>(privileged_roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let privileged_roles = privileged_roles
            .into_iter()
            .filter(|name| !name.as_ref().trim().is_empty())
            .map(|name| Role::from(name.as_ref()))
            .collect();
        Self { privileged_roles }
    }

    pub fn privileged_roles(&self) -> &[Role] {
        &self.privileged_roles
    }

    pub fn is_privileged(&self, role: &Role) -> bool {
        self.privileged_roles.contains(role)
    }
}
