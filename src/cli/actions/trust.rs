use crate::cli::globals::GlobalArgs;
use crate::katanaid::trust::Directive;
use anyhow::{bail, Result};

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub email: String,
    pub record: bool,
    pub user_id: Option<i64>,
}

/// Scores the device, optionally records the fingerprint, and fails when the
/// service says the action must be refused.
/// # Errors
/// Returns an error on transport failure or a `block` recommendation.
pub async fn execute(args: Args) -> Result<()> {
    let client = super::client(&args.globals)?;
    let result = client.trust().check_trust(&args.email).await?;

    println!("{}", serde_json::to_string_pretty(&result)?);

    if args.record {
        if let Some(task) = client.trust().record_fingerprint(args.user_id) {
            task.await?;
        }
    }

    match result.directive() {
        Directive::Proceed => println!("directive: proceed"),
        Directive::Challenge => println!("directive: challenge required"),
        Directive::Refuse => bail!("directive: refuse (fingerprint {})", result.fingerprint_id),
    }
    Ok(())
}
