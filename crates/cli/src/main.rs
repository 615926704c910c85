//! `relaychat` command-line client
//!
//! Run with: `relaychat <command>`
//!
//! Results are printed to stdout as JSON; logs and alerts go to stderr.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use relaychat_common::{HeaderAlertStore, TokenStore};
use relaychat_domain::{Config, LoginRequest, RegistrationRequest, UsersListQuery};
use relaychat_infra::observability::init_tracing;
use relaychat_infra::{
    config, open_storage, ApiError, AuthApi, AuthenticatedRequestExecutor, UsersApi,
};
use serde_json::json;
use tracing::debug;

mod args;

use args::{Cli, Command};

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Ignoring unreadable .env file: {e}");
        }
    }

    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Everything a command needs, wired from configuration
struct Client {
    config: Config,
    store: Arc<TokenStore>,
    auth: AuthApi,
    users: UsersApi,
    alerts: HeaderAlertStore,
}

impl Client {
    async fn connect() -> anyhow::Result<Self> {
        let config = config::load().context("failed to load configuration")?;
        init_tracing(&config.logging).context("failed to initialize logging")?;

        let storage = open_storage(&config.storage).context("failed to open token storage")?;
        let store = Arc::new(TokenStore::new(storage));
        let resumable = store.initialize().await.context("failed to read token storage")?;
        debug!(resumable, "Session store ready");

        let executor = Arc::new(
            AuthenticatedRequestExecutor::from_config(&config.api, store.clone())
                .context("failed to build gateway client")?,
        );

        Ok(Self {
            config,
            store,
            auth: AuthApi::new(executor.clone()),
            users: UsersApi::new(executor),
            alerts: HeaderAlertStore::new(),
        })
    }

    /// Route an API failure through the error banner, then surface it
    fn fail(&self, err: ApiError) -> anyhow::Error {
        self.alerts.set_error(err.alert_message());
        if let Some(alert) = self.alerts.error() {
            eprintln!("[error] {}", alert.message);
        }
        if err.is_auth_expired() {
            eprintln!("Session expired; run `relaychat login` again.");
        }
        anyhow::Error::new(err)
    }

    fn succeed(&self, message: &str, data: Option<serde_json::Value>) {
        self.alerts.set_success(message, data);
        if let Some(alert) = self.alerts.success() {
            eprintln!("[ok] {}", alert.message);
        }
    }
}

async fn run(command: Command) -> anyhow::Result<()> {
    let client = Client::connect().await?;

    let output = match command {
        Command::Login { login, password } => {
            let request = LoginRequest::new(login.clone(), password);
            client.auth.login(&request).await.map_err(|e| client.fail(e))?;
            client.succeed("Logged in", None);
            json!({ "login": login, "signedIn": true })
        }
        Command::Register { login, email, password } => {
            let request = RegistrationRequest::new(login, email, password);
            let user = client.auth.register(&request).await.map_err(|e| client.fail(e))?;
            let user = serde_json::to_value(&user).context("failed to encode user")?;
            client.succeed("Registration successful", Some(user.clone()));
            user
        }
        Command::Users(args) => {
            let query: UsersListQuery = args.into();
            let list = client.users.list_users(&query).await.map_err(|e| client.fail(e))?;
            serde_json::to_value(&list).context("failed to encode user list")?
        }
        Command::Logout => {
            client.auth.logout().await.map_err(|e| client.fail(e))?;
            client.succeed("Logged out", None);
            json!({ "signedIn": false })
        }
        Command::Status => {
            // The access token is process-local; a stored refresh token is
            // what lets the next command resume the session.
            let resumable = client
                .store
                .stored_refresh_token()
                .await
                .context("failed to read token storage")?
                .is_some();
            status_report(&client.config, resumable)
        }
    };

    let rendered = serde_json::to_string_pretty(&output).context("failed to render output")?;
    println!("{rendered}");
    Ok(())
}

/// Session state as seen from a fresh process
fn status_report(config: &Config, resumable: bool) -> serde_json::Value {
    json!({
        "gateway": config.api.gateway_url,
        "storage": config.storage.backend,
        "resumable": resumable,
    })
}
