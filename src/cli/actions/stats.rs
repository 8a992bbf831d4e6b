use crate::cli::globals::GlobalArgs;
use crate::katanaid::{
    dashboard::{self, TimeRange},
    errors::AppError,
    session::Session,
};
use anyhow::{anyhow, Result};
use secrecy::SecretString;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub token: SecretString,
    pub range: TimeRange,
}

/// # Errors
/// Returns an error if the token is rejected or the API is unreachable.
pub async fn execute(args: Args) -> Result<()> {
    let client = super::client(&args.globals)?;
    client.session().set(Session::new(Some(args.token), None));

    let stats = match dashboard::fetch_stats(client.api(), args.range).await {
        Ok(stats) => stats,
        Err(AppError::Unauthorized) => {
            return Err(anyhow!(
                "session expired, sign in again at {}",
                args.globals.login_path
            ))
        }
        Err(err) => return Err(err.into()),
    };

    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
