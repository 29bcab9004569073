//! Crank HTTP infrastructure.
//!
//! Implements the port traits defined in [`crank_domain`] over an
//! authenticated [`reqwest`] transport: one [`Transport`] per configured
//! server, one thin client per resource kind, and [`ClientSet`] as the typed
//! aggregate handed to reconcilers and the CLI.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain reconciliation rules.
//! All HTTP details (URL building, auth headers, the request deadline,
//! status classification) are handled here; the reconcile crate never sees
//! them.

pub mod apikey;
pub mod command;
pub mod config;
pub mod event;
pub mod platform;
pub mod repository;
pub mod run;
pub mod setting;
pub mod transport;
pub mod user;
pub mod vault;
pub mod vcs;

use std::sync::Arc;

use crank_domain::ApiError;

pub use apikey::ApiKeyClient;
pub use command::CommandClient;
pub use config::{Config, DEFAULT_ADDRESS};
pub use event::EventClient;
pub use platform::PlatformClient;
pub use repository::RepositoryClient;
pub use run::RunClient;
pub use setting::SettingClient;
pub use transport::Transport;
pub use user::UserClient;
pub use vault::VaultClient;
pub use vcs::VcsTokenClient;

/// The full set of resource clients bound to one server.
///
/// A plain struct rather than an opaque handle: downstream code receives
/// exactly the clients it needs, with no dynamic casts anywhere.
#[derive(Debug, Clone)]
pub struct ClientSet {
    pub commands: CommandClient,
    pub repositories: RepositoryClient,
    pub platforms: PlatformClient,
    pub settings: SettingClient,
    pub vcs_tokens: VcsTokenClient,
    pub runs: RunClient,
    pub users: UserClient,
    pub api_keys: ApiKeyClient,
    pub vault: VaultClient,
    pub events: EventClient,
}

impl ClientSet {
    /// Builds every client over one shared transport.
    ///
    /// Fails with [`ApiError::Config`] before any network call when the
    /// configuration is unusable.
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let transport = Arc::new(Transport::new(config)?);
        Ok(Self {
            commands: CommandClient::new(Arc::clone(&transport)),
            repositories: RepositoryClient::new(Arc::clone(&transport)),
            platforms: PlatformClient::new(Arc::clone(&transport)),
            settings: SettingClient::new(Arc::clone(&transport)),
            vcs_tokens: VcsTokenClient::new(Arc::clone(&transport)),
            runs: RunClient::new(Arc::clone(&transport)),
            users: UserClient::new(Arc::clone(&transport)),
            api_keys: ApiKeyClient::new(Arc::clone(&transport)),
            vault: VaultClient::new(Arc::clone(&transport)),
            events: EventClient::new(transport),
        })
    }
}
