use crate::cli::globals::GlobalArgs;
use crate::katanaid::{auth, gate::GateView};
use anyhow::Result;
use secrecy::SecretString;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub email: String,
    pub password: SecretString,
}

/// Signs in and prints the profile together with the gate decision.
/// # Errors
/// Returns an error if the credentials are rejected or the API is unreachable.
pub async fn execute(args: Args) -> Result<()> {
    let client = super::client(&args.globals)?;
    let profile = auth::login(client.api(), &args.email, &args.password).await?;

    println!("{}", serde_json::to_string_pretty(&profile)?);

    match client.verification_gate().current() {
        GateView::Unrestricted => println!("dashboard: unrestricted"),
        GateView::Blocked(overlay) => {
            println!("dashboard: blocked");
            println!("{}", overlay.title());
            println!("{}", overlay.message());
        }
    }
    Ok(())
}
