//! crankctl entry point.
//!
//! This binary is the composition root for the workspace. Responsibilities:
//!
//! 1. **Parse configuration** — connection flags with `CRANK_*` environment
//!    fallbacks, validated before any network call.
//! 2. **Wire observability** — configure `tracing-subscriber` with an
//!    `EnvFilter` (`RUST_LOG`) writing to stderr, so stdout stays clean for
//!    command output.
//! 3. **Construct infrastructure** — build the [`ClientSet`] over one shared
//!    transport and hand the clients to the per-kind reconcilers.
//! 4. **Dispatch** — one subcommand per resource kind. `apply` reads a
//!    declared-state TOML file and runs a reconcile cycle; `get`/`list` read;
//!    `destroy` deletes, treating an already-gone resource as success.
//!
//! Results are printed to stdout as pretty JSON. After a first `apply` the
//! printed record carries the server-assigned id; copy it into the declared
//! file so later applies converge instead of re-creating.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing_subscriber::EnvFilter;

use crank_client::config::{ADDRESS_ENV, API_KEY_ID_ENV, API_KEY_SECRET_ENV, EMAIL_ENV};
use crank_client::{ClientSet, Config, DEFAULT_ADDRESS};
use crank_domain::{
    ApiKeyId, CommandApi, CommandId, DesiredCommand, DesiredRepository, DesiredSetting,
    DesiredVcsToken, EventId, PlatformApi, PlatformId, RepositoryApi, RepositoryId, RunId,
    SettingApi, SettingId, UserId, VaultSecret,
};
use crank_reconcile::{
    CommandReconciler, IdentityAllocator, RepositoryReconciler, SettingReconciler,
    VcsTokenReconciler,
};

#[derive(Debug, Parser)]
#[command(name = "crankctl", about = "Declare and reconcile Crank resources", version)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,
    #[command(subcommand)]
    resource: Resource,
}

/// Connection settings shared by every subcommand.
#[derive(Debug, Args)]
struct ConnectionArgs {
    /// Base address of the Crank server.
    #[arg(long, env = ADDRESS_ENV, default_value = DEFAULT_ADDRESS)]
    address: String,
    /// API key id of the service account.
    #[arg(long, env = API_KEY_ID_ENV)]
    api_key_id: String,
    /// API key secret of the service account.
    #[arg(long, env = API_KEY_SECRET_ENV, hide_env_values = true)]
    api_key_secret: String,
    /// Email of the account the key pair belongs to.
    #[arg(long, env = EMAIL_ENV)]
    email: String,
}

impl ConnectionArgs {
    fn into_config(self) -> Config {
        Config::new(self.address, self.api_key_id, self.api_key_secret, self.email)
    }
}

#[derive(Debug, Subcommand)]
enum Resource {
    /// Commands and their platform/repository relationships.
    #[command(subcommand)]
    Command(CommandAction),
    /// Repositories watched for webhook events.
    #[command(subcommand)]
    Repository(RepositoryAction),
    /// Per-command settings.
    #[command(subcommand)]
    Setting(SettingAction),
    /// VCS access tokens (write-only, keyed by platform).
    #[command(subcommand)]
    Token(TokenAction),
    /// Supported VCS platforms (server-owned, read-only).
    #[command(subcommand)]
    Platform(PlatformAction),
    /// Command runs (read-only).
    #[command(subcommand)]
    Run(RunAction),
    /// User accounts.
    #[command(subcommand)]
    User(UserAction),
    /// API key pairs of a user.
    #[command(subcommand)]
    ApiKey(ApiKeyAction),
    /// Vault secrets.
    #[command(subcommand)]
    Vault(VaultAction),
    /// Received webhook events (read-only).
    #[command(subcommand)]
    Event(EventAction),
}

#[derive(Debug, Subcommand)]
enum CommandAction {
    /// Reconcile a command declared in a TOML file.
    Apply { file: PathBuf },
    Get { id: i64 },
    List,
    /// Delete a command; already-deleted is treated as success.
    Destroy { id: i64 },
}

#[derive(Debug, Subcommand)]
enum RepositoryAction {
    /// Reconcile a repository declared in a TOML file.
    Apply { file: PathBuf },
    Get { id: i64 },
    List,
    Destroy { id: i64 },
}

#[derive(Debug, Subcommand)]
enum SettingAction {
    /// Reconcile a command setting declared in a TOML file.
    Apply { file: PathBuf },
    Get { id: i64 },
    /// List the settings of one command.
    List { command: i64 },
    Destroy { id: i64 },
}

#[derive(Debug, Subcommand)]
enum TokenAction {
    /// Upsert the VCS token declared in a TOML file.
    Apply { file: PathBuf },
}

#[derive(Debug, Subcommand)]
enum PlatformAction {
    Get { id: i64 },
    List,
}

#[derive(Debug, Subcommand)]
enum RunAction {
    Get { id: i64 },
    List,
}

#[derive(Debug, Subcommand)]
enum UserAction {
    Get { id: i64 },
    List,
    Delete { id: i64 },
}

#[derive(Debug, Subcommand)]
enum ApiKeyAction {
    /// Generate a named key pair for a user. The secret is only ever
    /// returned by this call.
    Generate { user: i64, name: String },
    Get { user: i64, id: i64 },
    List { user: i64 },
    Delete { user: i64, id: i64 },
}

#[derive(Debug, Subcommand)]
enum VaultAction {
    Get { key: String },
    /// List secret names; values are never listed.
    List,
    /// Create or update one secret.
    Set { key: String, value: String },
    Delete { key: String },
}

#[derive(Debug, Subcommand)]
enum EventAction {
    Get { id: i64 },
    /// List the events received for one repository.
    List { repository: i64 },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs to stderr; stdout carries command output only.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let clients = ClientSet::new(&cli.connection.into_config())?;
    dispatch(cli.resource, clients).await
}

async fn dispatch(resource: Resource, clients: ClientSet) -> anyhow::Result<()> {
    match resource {
        Resource::Command(action) => {
            let reconciler = CommandReconciler::new(clients.commands.clone());
            match action {
                CommandAction::Apply { file } => {
                    let desired: DesiredCommand = read_declared(&file)?;
                    print_json(&reconciler.reconcile(&desired).await?)
                }
                CommandAction::Get { id } => {
                    print_json(&reconciler.fetch(CommandId::new(id)).await?)
                }
                CommandAction::List => print_json(&clients.commands.list().await?),
                CommandAction::Destroy { id } => {
                    reconciler.destroy(CommandId::new(id)).await?;
                    Ok(())
                }
            }
        }
        Resource::Repository(action) => {
            let reconciler = RepositoryReconciler::new(clients.repositories.clone());
            match action {
                RepositoryAction::Apply { file } => {
                    let desired: DesiredRepository = read_declared(&file)?;
                    print_json(&reconciler.reconcile(&desired).await?)
                }
                RepositoryAction::Get { id } => {
                    print_json(&reconciler.fetch(RepositoryId::new(id)).await?)
                }
                RepositoryAction::List => print_json(&clients.repositories.list().await?),
                RepositoryAction::Destroy { id } => {
                    reconciler.destroy(RepositoryId::new(id)).await?;
                    Ok(())
                }
            }
        }
        Resource::Setting(action) => {
            let reconciler = SettingReconciler::new(clients.settings.clone());
            match action {
                SettingAction::Apply { file } => {
                    let desired: DesiredSetting = read_declared(&file)?;
                    print_json(&reconciler.reconcile(&desired).await?)
                }
                SettingAction::Get { id } => print_json(&reconciler.fetch(SettingId::new(id)).await?),
                SettingAction::List { command } => {
                    print_json(&clients.settings.list_for_command(CommandId::new(command)).await?)
                }
                SettingAction::Destroy { id } => {
                    reconciler.destroy(SettingId::new(id)).await?;
                    Ok(())
                }
            }
        }
        Resource::Token(TokenAction::Apply { file }) => {
            let reconciler =
                VcsTokenReconciler::new(clients.vcs_tokens.clone(), Arc::new(IdentityAllocator::new()));
            let desired: DesiredVcsToken = read_declared(&file)?;
            let id = reconciler.reconcile(&desired).await?;
            tracing::info!(platform = %desired.vcs, local_id = %id, "token applied");
            Ok(())
        }
        Resource::Platform(action) => match action {
            PlatformAction::Get { id } => {
                print_json(&clients.platforms.get(PlatformId::new(id)).await?)
            }
            PlatformAction::List => print_json(&clients.platforms.list().await?),
        },
        Resource::Run(action) => match action {
            RunAction::Get { id } => print_json(&clients.runs.get(RunId::new(id)).await?),
            RunAction::List => print_json(&clients.runs.list().await?),
        },
        Resource::User(action) => match action {
            UserAction::Get { id } => print_json(&clients.users.get(UserId::new(id)).await?),
            UserAction::List => print_json(&clients.users.list().await?),
            UserAction::Delete { id } => {
                clients.users.delete(UserId::new(id)).await?;
                Ok(())
            }
        },
        Resource::ApiKey(action) => match action {
            ApiKeyAction::Generate { user, name } => {
                print_json(&clients.api_keys.create(UserId::new(user), &name).await?)
            }
            ApiKeyAction::Get { user, id } => {
                print_json(&clients.api_keys.get(UserId::new(user), ApiKeyId::new(id)).await?)
            }
            ApiKeyAction::List { user } => {
                print_json(&clients.api_keys.list(UserId::new(user)).await?)
            }
            ApiKeyAction::Delete { user, id } => {
                clients.api_keys.delete(UserId::new(user), ApiKeyId::new(id)).await?;
                Ok(())
            }
        },
        Resource::Vault(action) => match action {
            VaultAction::Get { key } => print_json(&clients.vault.get(&key).await?),
            VaultAction::List => print_json(&clients.vault.list().await?),
            VaultAction::Set { key, value } => {
                // Create first; an existing key answers 409 and becomes an
                // update.
                let secret = VaultSecret { key, value };
                match clients.vault.create(&secret).await {
                    Ok(()) => Ok(()),
                    Err(e) if e.is_conflict() => Ok(clients.vault.update(&secret).await?),
                    Err(e) => Err(e.into()),
                }
            }
            VaultAction::Delete { key } => {
                clients.vault.delete(&key).await?;
                Ok(())
            }
        },
        Resource::Event(action) => match action {
            EventAction::Get { id } => print_json(&clients.events.get(EventId::new(id)).await?),
            EventAction::List { repository } => print_json(
                &clients.events.list_for_repository(RepositoryId::new(repository)).await?,
            ),
        },
    }
}

/// Reads a declared-state TOML file.
fn read_declared<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading declared state from {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("parsing declared state in {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
