//! Route guard and navigation commands.

use super::Context;
use crate::output::{self, row, OutputFormat};
use access_routing::{access_for, navigation_for, normalize_path, GuardDecision, NavEntry, RouteAccess};
use anyhow::Result;
use auth_session::SessionStatus;
use serde::Serialize;
use std::fmt;

/// Guard verdict for one path.
#[derive(Debug, Serialize)]
pub struct RouteReport {
    pub path: String,
    pub access: RouteAccess,
    pub status: SessionStatus,
    #[serde(flatten)]
    pub decision: GuardDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub navigate_to: Option<String>,
}

impl fmt::Display for RouteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = match &self.decision {
            GuardDecision::Loading => "loading".to_string(),
            GuardDecision::Render => "render".to_string(),
            GuardDecision::RedirectToLogin { .. } | GuardDecision::Redirect { .. } => {
                format!("redirect to {}", self.navigate_to.as_deref().unwrap_or("?"))
            }
        };
        writeln!(f, "{}", row("Path", &self.path))?;
        writeln!(f, "{}", row("Session", self.status.as_str()))?;
        write!(f, "{}", row("Decision", &verdict))
    }
}

/// Menu for the current user.
#[derive(Debug, Serialize)]
pub struct NavReport {
    pub role: Option<String>,
    pub entries: Vec<NavEntry>,
}

impl fmt::Display for NavReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return write!(f, "No menu: not logged in");
        }
        let lines: Vec<String> = self
            .entries
            .iter()
            .map(|entry| format!("{:<14} {}", entry.label, entry.path))
            .collect();
        write!(f, "{}", lines.join("\n"))
    }
}

/// Evaluate the route guard for `path` against the current session.
pub async fn route(ctx: &Context, path: &str, format: &OutputFormat) -> Result<()> {
    let snapshot = ctx.manager.snapshot();
    let decision = ctx
        .policy
        .guard(snapshot.status, snapshot.user.as_ref(), path);

    let report = RouteReport {
        path: normalize_path(path),
        access: access_for(path),
        status: snapshot.status,
        navigate_to: decision.redirect_target(),
        decision,
    };
    output::print(&report, format);
    Ok(())
}

/// Print the navigation menu for the current user's role.
pub async fn nav(ctx: &Context, format: &OutputFormat) -> Result<()> {
    let report = match ctx.manager.current_user() {
        Some(user) => {
            let role = user.role();
            NavReport {
                entries: navigation_for(&role, &ctx.policy),
                role: Some(role.to_string()),
            }
        }
        None => NavReport {
            role: None,
            entries: Vec::new(),
        },
    };
    output::print(&report, format);
    Ok(())
}
