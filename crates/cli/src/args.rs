//! Command-line definition

use clap::{ArgAction, Args, Parser, Subcommand};
use relaychat_domain::UsersListQuery;

#[derive(Debug, Parser)]
#[command(name = "relaychat")]
#[command(version, about = "RelayChat client")]
#[command(after_help = "Configuration comes from RELAYCHAT_* environment variables \
(a .env file is honored) or ./relaychat.toml.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and store the session
    Login { login: String, password: String },
    /// Create an account
    Register { login: String, email: String, password: String },
    /// List users
    Users(UsersArgs),
    /// Forget the stored session
    Logout,
    /// Show session state
    Status,
}

/// Filters for `relaychat users`
#[derive(Debug, Args)]
pub struct UsersArgs {
    #[arg(long)]
    login: Option<String>,
    #[arg(long)]
    skip: Option<u64>,
    #[arg(long)]
    limit: Option<u64>,
    /// Field to sort by
    #[arg(long)]
    sort: Option<String>,
    /// Sort ascending
    #[arg(long, value_name = "true|false", action = ArgAction::Set)]
    asc: Option<bool>,
}

impl From<UsersArgs> for UsersListQuery {
    fn from(args: UsersArgs) -> Self {
        Self {
            login: args.login,
            skip: args.skip,
            limit: args.limit,
            sort_field: args.sort,
            sort_asc: args.asc,
        }
    }
}
