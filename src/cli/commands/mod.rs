pub mod api;
pub mod logging;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ArgAction, ColorChoice, Command,
};

pub const CMD_HEALTH: &str = "health";
pub const CMD_LOGIN: &str = "login";
pub const CMD_CONTACT: &str = "contact";
pub const CMD_TRUST: &str = "trust";
pub const CMD_STATS: &str = "stats";

fn email_arg() -> Arg {
    Arg::new("email")
        .short('e')
        .long("email")
        .help("Email address")
        .required(true)
}

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let command = Command::new("katanaid")
        .about("Trust and session guard client for KatanaID")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(Command::new(CMD_HEALTH).about("Probe the API health endpoint"))
        .subcommand(
            Command::new(CMD_LOGIN)
                .about("Sign in and show the verification gate")
                .arg(email_arg())
                .arg(
                    Arg::new("password")
                        .short('p')
                        .long("password")
                        .help("Account password")
                        .env("KATANAID_PASSWORD")
                        .hide_env_values(true)
                        .required(true),
                ),
        )
        .subcommand(
            Command::new(CMD_CONTACT)
                .about("Send a contact request through the submission guard")
                .arg(email_arg())
                .arg(
                    Arg::new("reason")
                        .short('r')
                        .long("reason")
                        .help("Message, 10 to 2000 characters")
                        .required(true),
                ),
        )
        .subcommand(
            Command::new(CMD_TRUST)
                .about("Score this device for an email and print the directive")
                .arg(email_arg())
                .arg(
                    Arg::new("record")
                        .long("record")
                        .help("Also record the fingerprint")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("user-id")
                        .long("user-id")
                        .help("User id attached to the recorded fingerprint")
                        .requires("record")
                        .value_parser(clap::value_parser!(i64)),
                ),
        )
        .subcommand(
            Command::new(CMD_STATS)
                .about("Fetch dashboard usage statistics")
                .arg(
                    Arg::new("token")
                        .short('t')
                        .long("token")
                        .help("Bearer token of an existing session")
                        .env("KATANAID_TOKEN")
                        .hide_env_values(true)
                        .required(true),
                )
                .arg(
                    Arg::new("range")
                        .long("range")
                        .help("Time range")
                        .default_value("7d")
                        .value_parser(["7d", "30d", "90d"]),
                ),
        );

    let command = api::with_args(command);
    logging::with_args(command)
}
