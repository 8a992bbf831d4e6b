use crate::cli::{
    actions::{contact, login, stats, trust, Action},
    commands::{CMD_CONTACT, CMD_HEALTH, CMD_LOGIN, CMD_STATS, CMD_TRUST},
    globals::GlobalArgs,
};
use crate::katanaid::dashboard::TimeRange;
use anyhow::{anyhow, bail, Context, Result};
use secrecy::SecretString;

fn required(matches: &clap::ArgMatches, name: &str) -> Result<String> {
    matches
        .get_one::<String>(name)
        .cloned()
        .with_context(|| format!("missing required argument: --{name}"))
}

/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let globals = GlobalArgs::from_matches(matches);
    // Fail before any network call on a bad URL or login path.
    globals.config()?;

    let Some((name, sub)) = matches.subcommand() else {
        bail!("no subcommand given");
    };

    match name {
        CMD_HEALTH => Ok(Action::Health(globals)),
        CMD_LOGIN => Ok(Action::Login(login::Args {
            globals,
            email: required(sub, "email")?,
            password: SecretString::from(required(sub, "password")?),
        })),
        CMD_CONTACT => Ok(Action::Contact(contact::Args {
            globals,
            email: required(sub, "email")?,
            reason: required(sub, "reason")?,
        })),
        CMD_TRUST => Ok(Action::Trust(trust::Args {
            globals,
            email: required(sub, "email")?,
            record: sub.get_flag("record"),
            user_id: sub.get_one::<i64>("user-id").copied(),
        })),
        CMD_STATS => Ok(Action::Stats(stats::Args {
            globals,
            token: SecretString::from(required(sub, "token")?),
            range: match sub.get_one::<String>("range") {
                Some(range) => range.parse::<TimeRange>().map_err(|err| anyhow!(err))?,
                None => TimeRange::default(),
            },
        })),
        other => bail!("unknown subcommand: {other}"),
    }
}
