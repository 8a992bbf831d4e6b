use clap::{Arg, Command};

pub const ARG_API_URL: &str = "api-url";
pub const ARG_LOGIN_PATH: &str = "login-path";
pub const ARG_TIMEOUT_MS: &str = "timeout-ms";
pub const ARG_COOLDOWN_MS: &str = "cooldown-ms";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_API_URL)
                .short('u')
                .long(ARG_API_URL)
                .help("Base URL of the KatanaID API")
                .default_value("http://localhost:8080")
                .env("KATANAID_API_URL")
                .global(true),
        )
        .arg(
            Arg::new(ARG_LOGIN_PATH)
                .long(ARG_LOGIN_PATH)
                .help("Login entry point reported when a session expires")
                .default_value("/login")
                .env("KATANAID_LOGIN_PATH")
                .global(true),
        )
        .arg(
            Arg::new(ARG_TIMEOUT_MS)
                .long(ARG_TIMEOUT_MS)
                .help("Request timeout in milliseconds")
                .default_value("10000")
                .env("KATANAID_TIMEOUT_MS")
                .global(true)
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new(ARG_COOLDOWN_MS)
                .long(ARG_COOLDOWN_MS)
                .help("Cooldown after a guarded submission in milliseconds")
                .default_value("3000")
                .env("KATANAID_COOLDOWN_MS")
                .global(true)
                .value_parser(clap::value_parser!(u64)),
        )
}
