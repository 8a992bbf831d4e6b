pub mod contact;
pub mod health;
pub mod login;
pub mod stats;
pub mod trust;

// Internal "interpreter" for `Action`, kept apart so this file stays small.
mod run;

use crate::cli::globals::GlobalArgs;
use crate::katanaid::{navigation::NoopNavigator, KatanaClient};
use std::sync::Arc;

#[derive(Debug)]
pub enum Action {
    Health(GlobalArgs),
    Login(login::Args),
    Contact(contact::Args),
    Trust(trust::Args),
    Stats(stats::Args),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}

/// Client for a single CLI invocation. Navigation requests are only logged.
fn client(globals: &GlobalArgs) -> anyhow::Result<KatanaClient> {
    Ok(KatanaClient::new(globals.config()?, Arc::new(NoopNavigator))?)
}
