//! Port traits the infrastructure implements.
//!
//! One trait per reconcilable resource kind, each a uniform binding of the
//! kind's remote operations. The reconcile crate is generic over these
//! traits, so its semantics can be exercised against in-memory fakes; the
//! client crate provides the HTTP implementations.
//!
//! Contract notes shared by all ports:
//!
//! - `get` returns the resource with every relationship list fully
//!   populated, or [`ApiError::NotFound`] when the server reports 404.
//! - `list` ordering is server-defined; callers must treat it as unordered.
//! - `create` sends scalar fields only — relationship membership is
//!   established through the dedicated edge operations.
//! - `update` replaces mutable fields only; immutable fields in the payload
//!   are rejected with [`ApiError::Validation`].
//! - `delete` of an id the server no longer knows surfaces
//!   [`ApiError::NotFound`]; deletion is not idempotent remotely.
//! - relationship add/remove surface [`ApiError::Conflict`] when the edge
//!   already exists (add) or does not exist (remove).

use async_trait::async_trait;

use crate::errors::ApiError;
use crate::identifiers::{CommandId, PlatformId, RepositoryId, SettingId};
use crate::resources::{
    Command, CommandFields, CommandSetting, Platform, Repository, RepositoryFields, SettingFields,
    VcsToken,
};

/// Remote operations on commands, including their relationship edges.
#[async_trait]
pub trait CommandApi: Send + Sync {
    async fn get(&self, id: CommandId) -> Result<Command, ApiError>;
    async fn list(&self) -> Result<Vec<Command>, ApiError>;
    async fn create(&self, fields: &CommandFields) -> Result<Command, ApiError>;
    async fn update(&self, id: CommandId, fields: &CommandFields) -> Result<Command, ApiError>;
    async fn delete(&self, id: CommandId) -> Result<(), ApiError>;
    async fn add_platform(&self, id: CommandId, platform: PlatformId) -> Result<(), ApiError>;
    async fn remove_platform(&self, id: CommandId, platform: PlatformId) -> Result<(), ApiError>;
    async fn add_repository(&self, id: CommandId, repository: RepositoryId)
        -> Result<(), ApiError>;
    async fn remove_repository(
        &self,
        id: CommandId,
        repository: RepositoryId,
    ) -> Result<(), ApiError>;
}

/// Remote operations on repositories.
#[async_trait]
pub trait RepositoryApi: Send + Sync {
    async fn get(&self, id: RepositoryId) -> Result<Repository, ApiError>;
    async fn list(&self) -> Result<Vec<Repository>, ApiError>;
    async fn create(&self, fields: &RepositoryFields) -> Result<Repository, ApiError>;
    async fn update(
        &self,
        id: RepositoryId,
        fields: &RepositoryFields,
    ) -> Result<Repository, ApiError>;
    async fn delete(&self, id: RepositoryId) -> Result<(), ApiError>;
}

/// Read access to the server-owned supported-platform table.
#[async_trait]
pub trait PlatformApi: Send + Sync {
    async fn get(&self, id: PlatformId) -> Result<Platform, ApiError>;
    async fn list(&self) -> Result<Vec<Platform>, ApiError>;
}

/// Remote operations on command settings.
#[async_trait]
pub trait SettingApi: Send + Sync {
    async fn get(&self, id: SettingId) -> Result<CommandSetting, ApiError>;
    async fn list_for_command(&self, command: CommandId)
        -> Result<Vec<CommandSetting>, ApiError>;
    async fn create(&self, fields: &SettingFields) -> Result<CommandSetting, ApiError>;
    async fn update(&self, id: SettingId, fields: &SettingFields)
        -> Result<CommandSetting, ApiError>;
    async fn delete(&self, id: SettingId) -> Result<(), ApiError>;
}

/// Remote operations on VCS tokens.
///
/// The server keys tokens by platform and exposes no individual identity;
/// `create` is therefore an upsert.
#[async_trait]
pub trait VcsTokenApi: Send + Sync {
    async fn create(&self, token: &VcsToken) -> Result<(), ApiError>;
}
