//! Raw API access through the session's client.

use super::Context;
use crate::output::OutputFormat;
use anyhow::Result;

/// `GET` an API path and print the JSON body.
///
/// Goes through the shared client, so a 401 here ends the session just
/// like anywhere else.
pub async fn get(ctx: &Context, path: &str, format: &OutputFormat) -> Result<()> {
    let response = match ctx.manager.client().get(path).await {
        Ok(response) => response,
        Err(failure) if failure.is_auth_failure() => {
            anyhow::bail!("{} (session ended, run 'labinv login')", failure)
        }
        Err(failure) => return Err(failure.into()),
    };

    let body = match format {
        OutputFormat::Text => serde_json::to_string_pretty(&response.body)?,
        OutputFormat::Json => serde_json::to_string(&response.body)?,
    };
    println!("{}", body);
    Ok(())
}
