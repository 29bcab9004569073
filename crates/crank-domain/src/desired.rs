//! Desired-state records supplied by the host tool.
//!
//! One record per reconcilable resource kind: the declared scalar fields plus
//! relationship sets held as ordered sets of remote ids. The optional `id`
//! is the last-known remote identity — absent until the first successful
//! create, and cleared again by the host whenever a resource is destroyed or
//! its create fails.
//!
//! Records deserialize from TOML/JSON so the CLI (and tests) can feed the
//! reconcilers from plain files.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::identifiers::{CommandId, PlatformId, RepositoryId, SettingId};
use crate::resources::{Auth, CommandFields, Gitlab, RepositoryFields, SettingFields, VcsToken};

/// Declared state for a command, including its relationship sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesiredCommand {
    /// Last-known remote identity; `None` before the first create.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CommandId>,
    pub name: String,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    pub enabled: bool,
    /// Platforms the command must be allowed to run for.
    #[serde(default)]
    pub platforms: BTreeSet<PlatformId>,
    /// Repositories the command must be attached to.
    #[serde(default)]
    pub repositories: BTreeSet<RepositoryId>,
}

impl DesiredCommand {
    /// The scalar-field payload for create and update calls.
    pub fn fields(&self) -> CommandFields {
        CommandFields {
            name: self.name.clone(),
            image: self.image.clone(),
            schedule: self.schedule.clone(),
            enabled: self.enabled,
        }
    }
}

/// Declared state for a repository.
///
/// The command list is not declared here: the command↔repository edge is
/// owned by the command side, and the server reports it on the repository as
/// a read-only projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesiredRepository {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RepositoryId>,
    pub name: String,
    pub url: String,
    pub vcs: PlatformId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<Auth>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gitlab: Option<Gitlab>,
}

impl DesiredRepository {
    /// The scalar-field payload for create and update calls.
    pub fn fields(&self) -> RepositoryFields {
        RepositoryFields {
            name: self.name.clone(),
            url: self.url.clone(),
            vcs: self.vcs,
            auth: self.auth.clone(),
            gitlab: self.gitlab,
        }
    }
}

/// Declared state for a command setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredSetting {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SettingId>,
    pub command_id: CommandId,
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub in_vault: bool,
}

impl DesiredSetting {
    /// The scalar-field payload for create and update calls.
    pub fn fields(&self) -> SettingFields {
        SettingFields {
            command_id: self.command_id,
            key: self.key.clone(),
            value: self.value.clone(),
            in_vault: self.in_vault,
        }
    }
}

/// Declared state for a VCS token.
///
/// Tokens have no remote identity; applying one is an upsert keyed by
/// platform on the server side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredVcsToken {
    pub token: String,
    pub vcs: PlatformId,
}

impl DesiredVcsToken {
    /// The wire payload for the token upsert.
    pub fn payload(&self) -> VcsToken {
        VcsToken { token: self.token.clone(), vcs: self.vcs }
    }
}
