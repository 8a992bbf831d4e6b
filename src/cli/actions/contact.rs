use crate::cli::globals::GlobalArgs;
use crate::katanaid::contact::Notice;
use anyhow::{bail, Result};

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub email: String,
    pub reason: String,
}

/// # Errors
/// Returns an error if validation fails or the API refuses the request.
pub async fn execute(args: Args) -> Result<()> {
    let client = super::client(&args.globals)?;
    let dialog = client.contact_dialog();
    dialog.open();
    dialog.set_email(args.email);
    dialog.set_reason(args.reason)?;

    match dialog.submit().await {
        Some(Notice::Success(message)) => println!("{message}"),
        Some(Notice::Error(message)) => bail!(message),
        None => println!("submission dropped"),
    }
    dialog.dispose();
    Ok(())
}
