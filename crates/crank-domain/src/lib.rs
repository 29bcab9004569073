//! Provisioning domain for the Crank automation server.
//!
//! This crate contains every domain concept shared across the workspace:
//! newtype identifiers, resource models, desired-state records, the error
//! taxonomy, and the port traits infrastructure implements. It has no I/O
//! dependencies — it defines *what* is needed; the client crate defines
//! *how* to supply it over HTTP, and the reconcile crate builds the
//! convergence logic on top of the ports.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`CommandId`, `RepositoryId`, etc.) |
//! | [`resources`] | Resource models and scalar-field payloads |
//! | [`desired`] | Desired-state records supplied by the host tool |
//! | [`errors`] | The [`ApiError`] taxonomy |
//! | [`ports`] | Async port traits the HTTP client implements |

pub mod desired;
pub mod errors;
pub mod identifiers;
pub mod ports;
pub mod resources;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use desired::{DesiredCommand, DesiredRepository, DesiredSetting, DesiredVcsToken};
pub use errors::ApiError;
pub use identifiers::{
    ApiKeyId, CommandId, EventId, LocalId, PlatformId, RepositoryId, RunId, SettingId, UserId,
};
pub use ports::{CommandApi, PlatformApi, RepositoryApi, SettingApi, VcsTokenApi};
pub use resources::{
    ApiKey, Auth, Command, CommandFields, CommandSetting, Event, Gitlab, Platform, Repository,
    RepositoryFields, ResourceKind, Run, SettingFields, User, UserFields, VaultSecret, VcsToken,
};
