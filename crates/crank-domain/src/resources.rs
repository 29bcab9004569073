//! Resource models as the Crank server returns them.
//!
//! Each model mirrors the server's JSON schema for that resource kind. A
//! model fetched through a client always has its relationship lists fully
//! populated; the lists are projections of server-side many-to-many edges
//! and carry the related resources by value.
//!
//! The `*Fields` structs are the scalar-field payloads sent on create and
//! update. Relationship membership is never part of a create or update
//! payload — edges are established one at a time through the relationship
//! endpoints, so a failed edge write can be retried independently of the
//! resource's own fields.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identifiers::{
    ApiKeyId, CommandId, EventId, PlatformId, RepositoryId, RunId, SettingId, UserId,
};

// ---------------------------------------------------------------------------
// Resource kinds
// ---------------------------------------------------------------------------

/// The kinds of resource managed against the server.
///
/// Used as a tag in error context and reconciliation reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Repository,
    Command,
    Platform,
    Setting,
    Run,
    User,
    VcsToken,
    ApiKey,
    VaultSecret,
    Event,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ResourceKind::Repository => "repository",
            ResourceKind::Command => "command",
            ResourceKind::Platform => "platform",
            ResourceKind::Setting => "setting",
            ResourceKind::Run => "run",
            ResourceKind::User => "user",
            ResourceKind::VcsToken => "vcs token",
            ResourceKind::ApiKey => "api key",
            ResourceKind::VaultSecret => "vault secret",
            ResourceKind::Event => "event",
        };
        write!(f, "{name}")
    }
}

// ---------------------------------------------------------------------------
// Platform
// ---------------------------------------------------------------------------

/// A VCS platform the server supports.
///
/// Server-owned: the set of supported platforms is fixed by the server
/// build, so this resource is read-only from the client side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    pub id: PlatformId,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// A container command the server runs in response to repository events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub id: CommandId,
    pub name: String,
    /// Container image to execute, e.g. `"crank-hq/slack-notify:v0.2"`.
    pub image: String,
    /// Optional cron-style schedule for commands that also run on a timer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    pub enabled: bool,
    /// Platforms this command is allowed to run for.
    #[serde(default)]
    pub platforms: Vec<Platform>,
    /// Repositories this command is attached to.
    #[serde(default)]
    pub repositories: Vec<Repository>,
}

impl Command {
    /// The platform relationship set, as remote ids.
    pub fn platform_ids(&self) -> BTreeSet<PlatformId> {
        self.platforms.iter().map(|p| p.id).collect()
    }

    /// The repository relationship set, as remote ids.
    pub fn repository_ids(&self) -> BTreeSet<RepositoryId> {
        self.repositories.iter().map(|r| r.id).collect()
    }

    /// The scalar fields of this command, as sent on create and update.
    pub fn fields(&self) -> CommandFields {
        CommandFields {
            name: self.name.clone(),
            image: self.image.clone(),
            schedule: self.schedule.clone(),
            enabled: self.enabled,
        }
    }
}

/// Scalar-field payload for command create and update calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandFields {
    pub name: String,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    pub enabled: bool,
}

// ---------------------------------------------------------------------------
// Repository
// ---------------------------------------------------------------------------

/// Hook authentication material for a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Auth {
    /// Shared secret used to sign and verify hook payloads.
    pub secret: String,
}

/// GitLab-specific repository settings.
///
/// Only present for repositories on a GitLab platform; the project id is
/// required there because GitLab addresses hooks per project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gitlab {
    pub project_id: i64,
}

/// A watched source repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub id: RepositoryId,
    pub name: String,
    pub url: String,
    /// The supported platform this repository lives on.
    pub vcs: PlatformId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<Auth>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gitlab: Option<Gitlab>,
    /// Commands attached to this repository. Server-owned projection of the
    /// command↔repository edge; the edge itself is managed from the command
    /// side.
    #[serde(default)]
    pub commands: Vec<Command>,
}

impl Repository {
    /// The command relationship set, as remote ids.
    pub fn command_ids(&self) -> BTreeSet<CommandId> {
        self.commands.iter().map(|c| c.id).collect()
    }

    /// The scalar fields of this repository, as sent on create and update.
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

/// Scalar-field payload for repository create and update calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryFields {
    pub name: String,
    pub url: String,
    pub vcs: PlatformId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<Auth>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gitlab: Option<Gitlab>,
}

// ---------------------------------------------------------------------------
// Command setting
// ---------------------------------------------------------------------------

/// A key/value setting attached to a command.
///
/// `key` and `command_id` are immutable after create; only `value` (and its
/// vault placement) may change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSetting {
    pub id: SettingId,
    pub command_id: CommandId,
    pub key: String,
    pub value: String,
    /// When set, the value is stored in the server's vault and the plain
    /// value is never returned on reads.
    pub in_vault: bool,
}

impl CommandSetting {
    /// The scalar fields of this setting, as sent on create and update.
    pub fn fields(&self) -> SettingFields {
        SettingFields {
            command_id: self.command_id,
            key: self.key.clone(),
            value: self.value.clone(),
            in_vault: self.in_vault,
        }
    }
}

/// Scalar-field payload for setting create and update calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingFields {
    pub command_id: CommandId,
    pub key: String,
    pub value: String,
    pub in_vault: bool,
}

// ---------------------------------------------------------------------------
// VCS token
// ---------------------------------------------------------------------------

/// An access token the server uses to talk back to a VCS platform.
///
/// The server keys tokens by platform and returns no individual identity
/// for them; creating a token for a platform that already has one replaces
/// it. Local bookkeeping uses a [`crate::LocalId`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VcsToken {
    pub token: String,
    pub vcs: PlatformId,
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// A single execution of a command, recorded by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub id: RunId,
    pub command_name: String,
    pub status: String,
    #[serde(default)]
    pub outcome: String,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// User and API keys
// ---------------------------------------------------------------------------

/// A user account on the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
    #[serde(default)]
    pub api_keys: Vec<ApiKey>,
}

impl User {
    /// The scalar fields of this user, as sent on create and update.
    pub fn fields(&self) -> UserFields {
        UserFields {
            email: self.email.clone(),
            display_name: self.display_name.clone(),
        }
    }
}

/// Scalar-field payload for user create and update calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFields {
    pub email: String,
    #[serde(default)]
    pub display_name: String,
}

/// An API key pair belonging to a user.
///
/// The secret is only returned once, on create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiKey {
    pub id: ApiKeyId,
    pub name: String,
    pub user_id: UserId,
    pub api_key_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_secret: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Vault secret
// ---------------------------------------------------------------------------

/// A named secret in the server's vault.
///
/// Addressed by key, not by integer id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultSecret {
    pub key: String,
    pub value: String,
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// A hook event received by the server for a repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub repository_id: RepositoryId,
    pub vcs: PlatformId,
    #[serde(default)]
    pub payload: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub command_runs: Vec<Run>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_relationship_sets_deduplicate_and_sort() {
        let platform = |id: i64| Platform { id: PlatformId::new(id), name: format!("p{id}") };
        let command = Command {
            id: CommandId::new(1),
            name: "notify".into(),
            image: "crank-hq/notify:v1".into(),
            schedule: None,
            enabled: true,
            platforms: vec![platform(3), platform(1), platform(3)],
            repositories: vec![],
        };
        let ids: Vec<i64> = command.platform_ids().iter().map(|p| p.as_i64()).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn command_decodes_with_missing_relationship_lists() {
        let raw = r#"{"id":7,"name":"lint","image":"crank-hq/lint:v2","enabled":false}"#;
        let command: Command = serde_json::from_str(raw).unwrap();
        assert_eq!(command.id, CommandId::new(7));
        assert!(command.platforms.is_empty());
        assert!(command.repositories.is_empty());
        assert_eq!(command.schedule, None);
    }

    #[test]
    fn create_payload_omits_relationships_and_empty_schedule() {
        let fields = CommandFields {
            name: "lint".into(),
            image: "crank-hq/lint:v2".into(),
            schedule: None,
            enabled: true,
        };
        let json = serde_json::to_value(&fields).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": "lint", "image": "crank-hq/lint:v2", "enabled": true})
        );
    }
}
