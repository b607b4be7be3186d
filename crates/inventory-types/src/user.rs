//! User profile snapshot.

use crate::Role;
use serde::{Deserialize, Deserializer, Serialize};

/// Nested lab object embedded in some user payloads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabRef {
    #[serde(
        default,
        deserialize_with = "lenient_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nama_lab: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub singkatan: Option<String>,
}

/// Profile snapshot of the authenticated user.
///
/// Mirrors the backend `User` resource. Unknown fields are ignored so the
/// backend can grow the resource without breaking cached snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub lab_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lab: Option<LabRef>,
    /// Department code. Kept for display only; never used to derive a lab.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kode_bagian: Option<String>,
}

impl User {
    /// Parsed role. A missing role is a plain `user`.
    pub fn role(&self) -> Role {
        self.role.as_deref().map(Role::from).unwrap_or_default()
    }

    /// Whether the role belongs to the admin-like set.
    pub fn is_admin_like(&self) -> bool {
        self.role().is_admin_like()
    }

    /// Lab this user belongs to.
    ///
    /// Direct `lab_id` wins, then the nested `lab.id`, otherwise `None`.
    pub fn current_lab_id(&self) -> Option<u64> {
        self.lab_id
            .or_else(|| self.lab.as_ref().and_then(|lab| lab.id))
    }

    /// Name for display, falling back to the email address.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.email,
        }
    }
}

/// Accepts a JSON number or a numeric string; anything else becomes `None`.
fn lenient_id<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_u64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<u64>().ok(),
        _ => None,
    })
}
