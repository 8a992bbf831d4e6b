use crate::cli::globals::GlobalArgs;
use crate::katanaid::health;
use anyhow::{bail, Result};
use tracing::info;

/// # Errors
/// Returns an error if the API cannot be reached or reports a bad status.
pub async fn execute(globals: &GlobalArgs) -> Result<()> {
    let client = super::client(globals)?;
    let response = health::check(client.api()).await?;
    info!(status = %response.status, "health probe");

    println!("{}", serde_json::to_string_pretty(&response)?);

    if !response.is_healthy() {
        bail!("API reported status '{}'", response.status);
    }
    Ok(())
}
