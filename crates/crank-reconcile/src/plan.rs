//! Pure planning: comparing desired against observed state.
//!
//! Everything in this module is side-effect free. A plan is computed once
//! per reconcile cycle, executed by the reconciler, and discarded; it is
//! never cached across cycles because the server is the source of truth.
//!
//! Relationship membership is diffed as a true set difference per related
//! kind: `to_add = desired − observed`, `to_remove = observed − desired`.
//! Order within each delta is ascending by id — membership is the only
//! meaningful property of a relationship set, but a deterministic order
//! keeps runs reproducible.

use std::collections::BTreeSet;

use crank_domain::{
    ApiError, Command, CommandFields, CommandSetting, DesiredCommand, DesiredRepository,
    DesiredSetting, PlatformId, Repository, RepositoryFields, RepositoryId, ResourceKind,
    SettingFields,
};

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// One remote operation within a reconcile cycle.
///
/// Carried in execution reports and error context so a caller can always
/// tell which sub-operations of a failed cycle had already succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Read of the observed state (never part of a computed plan).
    FetchResource,
    CreateResource,
    UpdateResource,
    DeleteResource,
    AddRelationship { kind: ResourceKind, id: i64 },
    RemoveRelationship { kind: ResourceKind, id: i64 },
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::FetchResource => write!(f, "fetch"),
            Operation::CreateResource => write!(f, "create"),
            Operation::UpdateResource => write!(f, "update"),
            Operation::DeleteResource => write!(f, "delete"),
            Operation::AddRelationship { kind, id } => {
                write!(f, "add relationship to {kind} {id}")
            }
            Operation::RemoveRelationship { kind, id } => {
                write!(f, "remove relationship to {kind} {id}")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Relationship deltas
// ---------------------------------------------------------------------------

/// The set difference between a desired and an observed relationship set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipDelta<T> {
    /// Ids present in desired but not observed, ascending.
    pub to_add: Vec<T>,
    /// Ids present in observed but not desired, ascending.
    pub to_remove: Vec<T>,
}

impl<T: Ord + Copy> RelationshipDelta<T> {
    /// Computes `desired − observed` and `observed − desired`.
    pub fn between(desired: &BTreeSet<T>, observed: &BTreeSet<T>) -> Self {
        Self {
            to_add: desired.difference(observed).copied().collect(),
            to_remove: observed.difference(desired).copied().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Command plan
// ---------------------------------------------------------------------------

/// The operations needed to converge one command onto its desired state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPlan {
    /// Replacement scalar fields, present only when at least one differs.
    pub update: Option<CommandFields>,
    pub platforms: RelationshipDelta<PlatformId>,
    pub repositories: RelationshipDelta<RepositoryId>,
}

impl CommandPlan {
    pub fn compute(desired: &DesiredCommand, observed: &Command) -> Self {
        let fields = desired.fields();
        Self {
            update: (fields != observed.fields()).then_some(fields),
            platforms: RelationshipDelta::between(&desired.platforms, &observed.platform_ids()),
            repositories: RelationshipDelta::between(
                &desired.repositories,
                &observed.repository_ids(),
            ),
        }
    }

    /// `true` when the cycle has nothing to do: no field update is sent and
    /// no relationship edge changes.
    pub fn is_empty(&self) -> bool {
        self.update.is_none() && self.platforms.is_empty() && self.repositories.is_empty()
    }

    /// The plan as an ordered operation list: the field update first, then
    /// per relationship kind every add before every remove, so a command is
    /// never transiently left without a relationship kind it declares.
    pub fn operations(&self) -> Vec<Operation> {
        let mut ops = Vec::new();
        if self.update.is_some() {
            ops.push(Operation::UpdateResource);
        }
        for id in &self.platforms.to_add {
            ops.push(Operation::AddRelationship {
                kind: ResourceKind::Platform,
                id: id.as_i64(),
            });
        }
        for id in &self.platforms.to_remove {
            ops.push(Operation::RemoveRelationship {
                kind: ResourceKind::Platform,
                id: id.as_i64(),
            });
        }
        for id in &self.repositories.to_add {
            ops.push(Operation::AddRelationship {
                kind: ResourceKind::Repository,
                id: id.as_i64(),
            });
        }
        for id in &self.repositories.to_remove {
            ops.push(Operation::RemoveRelationship {
                kind: ResourceKind::Repository,
                id: id.as_i64(),
            });
        }
        ops
    }
}

// ---------------------------------------------------------------------------
// Repository plan
// ---------------------------------------------------------------------------

/// The operations needed to converge one repository onto its desired state.
///
/// Repositories have no client-managed relationship sets (the command edge
/// is owned by the command side), so the plan is a field update at most.
#[derive(Debug, Clone, PartialEq)]
pub struct RepositoryPlan {
    pub update: Option<RepositoryFields>,
}

impl RepositoryPlan {
    pub fn compute(desired: &DesiredRepository, observed: &Repository) -> Self {
        Self { update: fields_differ(desired, observed).then(|| desired.fields()) }
    }

    pub fn is_empty(&self) -> bool {
        self.update.is_none()
    }
}

/// The hook secret is write-only: the server never returns it on reads, so
/// auth is compared only when both sides carry a value.
fn fields_differ(desired: &DesiredRepository, observed: &Repository) -> bool {
    if desired.name != observed.name
        || desired.url != observed.url
        || desired.vcs != observed.vcs
        || desired.gitlab != observed.gitlab
    {
        return true;
    }
    matches!((&desired.auth, &observed.auth), (Some(d), Some(o)) if d != o)
}

// ---------------------------------------------------------------------------
// Setting plan
// ---------------------------------------------------------------------------

/// The operations needed to converge one command setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingPlan {
    pub update: Option<SettingFields>,
}

impl SettingPlan {
    /// Fails locally, before any network call, when the declared state
    /// mutates an immutable field (`key`, `command_id`).
    pub fn compute(desired: &DesiredSetting, observed: &CommandSetting) -> Result<Self, ApiError> {
        if desired.key != observed.key {
            return Err(ApiError::Validation {
                message: format!(
                    "setting key is immutable (declared {:?}, remote {:?})",
                    desired.key, observed.key
                ),
            });
        }
        if desired.command_id != observed.command_id {
            return Err(ApiError::Validation {
                message: format!(
                    "setting command_id is immutable (declared {}, remote {})",
                    desired.command_id, observed.command_id
                ),
            });
        }
        let changed = desired.value != observed.value || desired.in_vault != observed.in_vault;
        Ok(Self { update: changed.then(|| desired.fields()) })
    }

    pub fn is_empty(&self) -> bool {
        self.update.is_none()
    }
}
