use crate::cli::actions::{contact, health, login, stats, trust, Action};
use anyhow::Result;

/// Execute the provided action.
// Single dispatch point for all CLI actions.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Health(globals) => health::execute(&globals).await,
        Action::Login(args) => login::execute(args).await,
        Action::Contact(args) => contact::execute(args).await,
        Action::Trust(args) => trust::execute(args).await,
        Action::Stats(args) => stats::execute(args).await,
    }
}
