//! Authentication commands.

use super::Context;
use crate::output::{self, row, OutputFormat};
use access_routing::landing_route;
use anyhow::Result;
use auth_session::{SessionSnapshot, SessionStatus};
use inventory_types::User;
use serde::Serialize;
use std::fmt;
use std::io::{self, Write};

/// Session summary printed by `status` and `whoami`.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub status: SessionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lab_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub landing: Option<&'static str>,
}

impl StatusReport {
    pub fn new(status: SessionStatus, user: Option<User>) -> Self {
        let role = user.as_ref().map(User::role);
        Self {
            status,
            lab_id: user.as_ref().and_then(User::current_lab_id),
            landing: role.as_ref().map(landing_route),
            role: role.map(|r| r.to_string()),
            user,
        }
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", row("Session", self.status.as_str()))?;
        if let Some(user) = &self.user {
            write!(f, "\n{}", row("User", user.display_name()))?;
            write!(f, "\n{}", row("Email", &user.email))?;
        }
        if let Some(role) = &self.role {
            write!(f, "\n{}", row("Role", role))?;
        }
        if let Some(lab_id) = self.lab_id {
            write!(f, "\n{}", row("Lab", &lab_id.to_string()))?;
        }
        if let Some(landing) = self.landing {
            write!(f, "\n{}", row("Home", landing))?;
        }
        Ok(())
    }
}

fn prompt_email() -> Result<String> {
    print!("Email: ");
    io::stdout().flush()?;
    let mut email = String::new();
    io::stdin().read_line(&mut email)?;
    Ok(email.trim().to_string())
}

/// Message shown instead of logging in again, `None` when login should go
/// ahead. `force` switches accounts over an existing session.
fn already_logged_in(snapshot: &SessionSnapshot, force: bool) -> Option<String> {
    if force || snapshot.status != SessionStatus::Authenticated {
        return None;
    }
    snapshot.user.as_ref().map(|user| {
        format!(
            "Already logged in as {}. Use --force to switch accounts",
            user.email
        )
    })
}

/// Login with email and password.
///
/// With `force`, an existing session is replaced only once the new
/// credentials are accepted.
pub async fn login(
    ctx: &Context,
    email: Option<String>,
    from: Option<&str>,
    force: bool,
    format: &OutputFormat,
) -> Result<()> {
    if let Some(message) = already_logged_in(&ctx.snapshot, force) {
        output::print_success(&message, format);
        return Ok(());
    }

    let email = match email {
        Some(email) => email.trim().to_string(),
        None => prompt_email()?,
    };
    if email.is_empty() {
        anyhow::bail!("Email is required");
    }

    // Read password without echo
    let password = rpassword::prompt_password("Password: ")?;
    if password.is_empty() {
        anyhow::bail!("Password is required");
    }

    let user = ctx.manager.login(&email, &password).await?;
    let destination = ctx.policy.post_login_destination(&user, from);

    output::print_success(
        &format!("Logged in as {} ({}), continue at {}", user.display_name(), user.role(), destination),
        format,
    );
    Ok(())
}

/// Logout and clear the local session.
pub async fn logout(ctx: &Context, format: &OutputFormat) -> Result<()> {
    let was_authenticated = ctx.snapshot.is_authenticated();
    ctx.manager.logout().await?;

    if was_authenticated {
        output::print_success("Logged out successfully", format);
    } else {
        output::print_success("Not logged in", format);
    }
    Ok(())
}

/// Show the session state.
pub async fn status(ctx: &Context, format: &OutputFormat) -> Result<()> {
    let snapshot = ctx.manager.snapshot();
    output::print(&StatusReport::new(snapshot.status, snapshot.user), format);
    Ok(())
}

/// Show the signed-in user, failing when there is none.
pub async fn whoami(ctx: &Context, format: &OutputFormat) -> Result<()> {
    let Some(user) = ctx.manager.current_user() else {
        anyhow::bail!("Not logged in. Run 'labinv login' first");
    };
    output::print(&StatusReport::new(ctx.manager.status(), Some(user)), format);
    Ok(())
}
