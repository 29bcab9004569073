//! Command reconciliation.
//!
//! The richest cycle in the workspace: commands carry scalar fields plus
//! two relationship sets (platforms, repositories). One call to
//! [`CommandReconciler::reconcile`] runs one cycle: fetch observed state,
//! compute the plan, execute it in order, and return the freshly observed
//! command. The first failed operation aborts the remainder of the cycle;
//! nothing is rolled back, and the next cycle converges by re-diffing.

use crank_domain::{Command, CommandApi, CommandId, DesiredCommand, PlatformId, RepositoryId, ResourceKind};

use crate::error::ReconcileError;
use crate::plan::{CommandPlan, Operation};

const KIND: ResourceKind = ResourceKind::Command;

/// Reconciles declared commands against the server.
///
/// Stateless apart from the API binding; safe to share across independent
/// resources reconciled concurrently.
#[derive(Debug, Clone)]
pub struct CommandReconciler<A> {
    api: A,
}

impl<A: CommandApi> CommandReconciler<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// Runs one reconcile cycle and returns the observed state afterwards.
    ///
    /// Without a remote id the command is created and its declared
    /// relationships populated. With one, the observed state is fetched
    /// fresh; a remote deletion out of band (404) clears the stale identity
    /// and the cycle restarts as a create.
    pub async fn reconcile(&self, desired: &DesiredCommand) -> Result<Command, ReconcileError> {
        match desired.id {
            None => self.create(desired).await,
            Some(id) => match self.api.get(id).await {
                Ok(observed) => self.converge(desired, observed).await,
                Err(e) if e.is_not_found() => {
                    tracing::debug!(%id, "command gone from server, re-creating");
                    self.create(desired).await
                }
                Err(e) => Err(ReconcileError::new(
                    KIND,
                    Operation::FetchResource,
                    Some(id.as_i64()),
                    Vec::new(),
                    e,
                )),
            },
        }
    }

    /// Fetches the observed state outside of an apply cycle.
    pub async fn fetch(&self, id: CommandId) -> Result<Command, ReconcileError> {
        self.api.get(id).await.map_err(|e| {
            ReconcileError::new(KIND, Operation::FetchResource, Some(id.as_i64()), Vec::new(), e)
        })
    }

    /// Deletes the remote command. A 404 means it is already gone and the
    /// destroy is a no-op; the identity is considered cleared either way.
    pub async fn destroy(&self, id: CommandId) -> Result<(), ReconcileError> {
        match self.api.delete(id).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(ReconcileError::new(
                KIND,
                Operation::DeleteResource,
                Some(id.as_i64()),
                Vec::new(),
                e,
            )),
        }
    }

    /// Create branch: fields first, then every declared relationship.
    /// There is no remove phase — a fresh command has no prior edges.
    async fn create(&self, desired: &DesiredCommand) -> Result<Command, ReconcileError> {
        let created = self.api.create(&desired.fields()).await.map_err(|e| {
            // Failed create binds nothing: the caller must not believe the
            // command exists.
            ReconcileError::new(KIND, Operation::CreateResource, None, Vec::new(), e)
        })?;
        let id = created.id;
        let mut applied = vec![Operation::CreateResource];

        for platform in &desired.platforms {
            self.add_platform(id, *platform, &mut applied).await?;
        }
        for repository in &desired.repositories {
            self.add_repository(id, *repository, &mut applied).await?;
        }
        self.observe(id, applied).await
    }

    /// Update branch: field replacement only when a field differs, then per
    /// relationship kind every add before every remove.
    async fn converge(
        &self,
        desired: &DesiredCommand,
        observed: Command,
    ) -> Result<Command, ReconcileError> {
        let plan = CommandPlan::compute(desired, &observed);
        if plan.is_empty() {
            return Ok(observed);
        }
        let id = observed.id;
        let mut applied = Vec::new();

        if let Some(fields) = &plan.update {
            self.api.update(id, fields).await.map_err(|e| {
                ReconcileError::new(
                    KIND,
                    Operation::UpdateResource,
                    Some(id.as_i64()),
                    applied.clone(),
                    e,
                )
            })?;
            applied.push(Operation::UpdateResource);
        }

        for platform in &plan.platforms.to_add {
            self.add_platform(id, *platform, &mut applied).await?;
        }
        for platform in &plan.platforms.to_remove {
            let op = Operation::RemoveRelationship {
                kind: ResourceKind::Platform,
                id: platform.as_i64(),
            };
            self.api.remove_platform(id, *platform).await.map_err(|e| {
                ReconcileError::new(KIND, op.clone(), Some(id.as_i64()), applied.clone(), e)
            })?;
            applied.push(op);
        }
        for repository in &plan.repositories.to_add {
            self.add_repository(id, *repository, &mut applied).await?;
        }
        for repository in &plan.repositories.to_remove {
            let op = Operation::RemoveRelationship {
                kind: ResourceKind::Repository,
                id: repository.as_i64(),
            };
            self.api.remove_repository(id, *repository).await.map_err(|e| {
                ReconcileError::new(KIND, op.clone(), Some(id.as_i64()), applied.clone(), e)
            })?;
            applied.push(op);
        }

        self.observe(id, applied).await
    }

    async fn add_platform(
        &self,
        id: CommandId,
        platform: PlatformId,
        applied: &mut Vec<Operation>,
    ) -> Result<(), ReconcileError> {
        let op = Operation::AddRelationship { kind: ResourceKind::Platform, id: platform.as_i64() };
        self.api.add_platform(id, platform).await.map_err(|e| {
            ReconcileError::new(KIND, op.clone(), Some(id.as_i64()), applied.clone(), e)
        })?;
        applied.push(op);
        Ok(())
    }

    async fn add_repository(
        &self,
        id: CommandId,
        repository: RepositoryId,
        applied: &mut Vec<Operation>,
    ) -> Result<(), ReconcileError> {
        let op =
            Operation::AddRelationship { kind: ResourceKind::Repository, id: repository.as_i64() };
        self.api.add_repository(id, repository).await.map_err(|e| {
            ReconcileError::new(KIND, op.clone(), Some(id.as_i64()), applied.clone(), e)
        })?;
        applied.push(op);
        Ok(())
    }

    /// Re-reads the command after mutations so the caller always receives
    /// the server's view, never a locally assembled one.
    async fn observe(
        &self,
        id: CommandId,
        applied: Vec<Operation>,
    ) -> Result<Command, ReconcileError> {
        self.api.get(id).await.map_err(|e| {
            ReconcileError::new(KIND, Operation::FetchResource, Some(id.as_i64()), applied, e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crank_domain::{ApiError, CommandFields, Platform, Repository};
    use std::collections::{BTreeMap, BTreeSet};
    use std::sync::Mutex;

    /// In-memory stand-in for the command endpoints: a map of commands, a
    /// call log, and an optional call name to fail on.
    #[derive(Default)]
    struct FakeCommandApi {
        inner: Mutex<Inner>,
    }

    #[derive(Default)]
    struct Inner {
        commands: BTreeMap<i64, Command>,
        next_id: i64,
        calls: Vec<String>,
        fail_on: Option<(&'static str, ApiError)>,
    }

    impl FakeCommandApi {
        fn with_command(self, command: Command) -> Self {
            self.inner.lock().unwrap().commands.insert(command.id.as_i64(), command);
            self
        }

        fn failing_on(self, call: &'static str, error: ApiError) -> Self {
            self.inner.lock().unwrap().fail_on = Some((call, error));
            self
        }

        fn calls(&self) -> Vec<String> {
            self.inner.lock().unwrap().calls.clone()
        }

        fn record(&self, call: String) -> Result<(), ApiError> {
            let mut inner = self.inner.lock().unwrap();
            inner.calls.push(call.clone());
            match &inner.fail_on {
                Some((name, error)) if call.starts_with(name) => Err(error.clone()),
                _ => Ok(()),
            }
        }
    }

    fn missing(id: i64) -> ApiError {
        ApiError::NotFound { url: format!("http://localhost:9998/command/{id}") }
    }

    #[async_trait]
    impl CommandApi for &FakeCommandApi {
        async fn get(&self, id: CommandId) -> Result<Command, ApiError> {
            self.record(format!("get {id}"))?;
            let inner = self.inner.lock().unwrap();
            inner.commands.get(&id.as_i64()).cloned().ok_or_else(|| missing(id.as_i64()))
        }

        async fn list(&self) -> Result<Vec<Command>, ApiError> {
            self.record("list".into())?;
            Ok(self.inner.lock().unwrap().commands.values().cloned().collect())
        }

        async fn create(&self, fields: &CommandFields) -> Result<Command, ApiError> {
            self.record(format!("create {}", fields.name))?;
            let mut inner = self.inner.lock().unwrap();
            inner.next_id += 1;
            let command = Command {
                id: CommandId::new(inner.next_id),
                name: fields.name.clone(),
                image: fields.image.clone(),
                schedule: fields.schedule.clone(),
                enabled: fields.enabled,
                platforms: vec![],
                repositories: vec![],
            };
            let id = inner.next_id;
            inner.commands.insert(id, command.clone());
            Ok(command)
        }

        async fn update(&self, id: CommandId, fields: &CommandFields) -> Result<Command, ApiError> {
            self.record(format!("update {id}"))?;
            let mut inner = self.inner.lock().unwrap();
            let command =
                inner.commands.get_mut(&id.as_i64()).ok_or_else(|| missing(id.as_i64()))?;
            command.name = fields.name.clone();
            command.image = fields.image.clone();
            command.schedule = fields.schedule.clone();
            command.enabled = fields.enabled;
            Ok(command.clone())
        }

        async fn delete(&self, id: CommandId) -> Result<(), ApiError> {
            self.record(format!("delete {id}"))?;
            let mut inner = self.inner.lock().unwrap();
            inner.commands.remove(&id.as_i64()).map(drop).ok_or_else(|| missing(id.as_i64()))
        }

        async fn add_platform(&self, id: CommandId, platform: PlatformId) -> Result<(), ApiError> {
            self.record(format!("add_platform {id} {platform}"))?;
            let mut inner = self.inner.lock().unwrap();
            let command =
                inner.commands.get_mut(&id.as_i64()).ok_or_else(|| missing(id.as_i64()))?;
            if command.platform_ids().contains(&platform) {
                return Err(ApiError::Conflict { url: format!("add_platform {platform}") });
            }
            command
                .platforms
                .push(Platform { id: platform, name: format!("platform-{platform}") });
            Ok(())
        }

        async fn remove_platform(
            &self,
            id: CommandId,
            platform: PlatformId,
        ) -> Result<(), ApiError> {
            self.record(format!("remove_platform {id} {platform}"))?;
            let mut inner = self.inner.lock().unwrap();
            let command =
                inner.commands.get_mut(&id.as_i64()).ok_or_else(|| missing(id.as_i64()))?;
            if !command.platform_ids().contains(&platform) {
                return Err(ApiError::Conflict { url: format!("remove_platform {platform}") });
            }
            command.platforms.retain(|p| p.id != platform);
            Ok(())
        }

        async fn add_repository(
            &self,
            id: CommandId,
            repository: RepositoryId,
        ) -> Result<(), ApiError> {
            self.record(format!("add_repository {id} {repository}"))?;
            let mut inner = self.inner.lock().unwrap();
            let command =
                inner.commands.get_mut(&id.as_i64()).ok_or_else(|| missing(id.as_i64()))?;
            if command.repository_ids().contains(&repository) {
                return Err(ApiError::Conflict { url: format!("add_repository {repository}") });
            }
            command.repositories.push(Repository {
                id: repository,
                name: format!("repo-{repository}"),
                url: String::new(),
                vcs: PlatformId::new(1),
                auth: None,
                gitlab: None,
                commands: vec![],
            });
            Ok(())
        }

        async fn remove_repository(
            &self,
            id: CommandId,
            repository: RepositoryId,
        ) -> Result<(), ApiError> {
            self.record(format!("remove_repository {id} {repository}"))?;
            let mut inner = self.inner.lock().unwrap();
            let command =
                inner.commands.get_mut(&id.as_i64()).ok_or_else(|| missing(id.as_i64()))?;
            if !command.repository_ids().contains(&repository) {
                return Err(ApiError::Conflict { url: format!("remove_repository {repository}") });
            }
            command.repositories.retain(|r| r.id != repository);
            Ok(())
        }
    }

    fn desired(id: Option<i64>, platforms: &[i64]) -> DesiredCommand {
        DesiredCommand {
            id: id.map(CommandId::new),
            name: "notify".into(),
            image: "crank-hq/notify:v1".into(),
            schedule: None,
            enabled: true,
            platforms: platforms.iter().copied().map(PlatformId::new).collect(),
            repositories: BTreeSet::new(),
        }
    }

    fn existing(id: i64, platforms: &[i64]) -> Command {
        Command {
            id: CommandId::new(id),
            name: "notify".into(),
            image: "crank-hq/notify:v1".into(),
            schedule: None,
            enabled: true,
            platforms: platforms
                .iter()
                .map(|&p| Platform { id: PlatformId::new(p), name: format!("platform-{p}") })
                .collect(),
            repositories: vec![],
        }
    }

    #[tokio::test]
    async fn create_binds_identity_and_populates_relationships() {
        let api = FakeCommandApi::default();
        let reconciler = CommandReconciler::new(&api);

        let observed = reconciler.reconcile(&desired(None, &[2, 1])).await.unwrap();
        assert_eq!(observed.id, CommandId::new(1));
        assert_eq!(
            observed.platform_ids().iter().map(|p| p.as_i64()).collect::<Vec<_>>(),
            vec![1, 2]
        );
        // Ascending, adds only, fresh read at the end.
        assert_eq!(
            api.calls(),
            vec!["create notify", "add_platform 1 1", "add_platform 1 2", "get 1"]
        );
    }

    #[tokio::test]
    async fn matching_states_emit_no_operations() {
        let api = FakeCommandApi::default().with_command(existing(4, &[1, 2]));
        let reconciler = CommandReconciler::new(&api);

        let observed = reconciler.reconcile(&desired(Some(4), &[1, 2])).await.unwrap();
        assert_eq!(observed, existing(4, &[1, 2]));
        assert_eq!(api.calls(), vec!["get 4"]);
    }

    #[tokio::test]
    async fn reconcile_is_idempotent_across_cycles() {
        let api = FakeCommandApi::default().with_command(existing(4, &[1, 3]));
        let reconciler = CommandReconciler::new(&api);
        let want = desired(Some(4), &[2, 3]);

        reconciler.reconcile(&want).await.unwrap();
        let calls_before = api.calls().len();
        reconciler.reconcile(&want).await.unwrap();
        // Second cycle only re-reads; its plan is empty.
        assert_eq!(api.calls()[calls_before..], ["get 4"]);
    }

    #[tokio::test]
    async fn adds_are_issued_before_removes() {
        let api = FakeCommandApi::default().with_command(existing(4, &[1, 2, 3]));
        let reconciler = CommandReconciler::new(&api);

        reconciler.reconcile(&desired(Some(4), &[2, 3, 4])).await.unwrap();
        assert_eq!(
            api.calls(),
            vec!["get 4", "add_platform 4 4", "remove_platform 4 1", "get 4"]
        );
    }

    #[tokio::test]
    async fn missing_remote_during_update_cycle_restarts_as_create() {
        let api = FakeCommandApi::default();
        let reconciler = CommandReconciler::new(&api);

        // Identity points at a command the server no longer has.
        let observed = reconciler.reconcile(&desired(Some(99), &[1])).await.unwrap();
        assert_ne!(observed.id, CommandId::new(99));
        assert_eq!(
            api.calls(),
            vec!["get 99", "create notify", "add_platform 1 1", "get 1"]
        );
    }

    #[tokio::test]
    async fn server_error_halts_the_cycle_and_reports_applied_operations() {
        let api = FakeCommandApi::default()
            .with_command(existing(4, &[1]))
            .failing_on(
                "remove_platform",
                ApiError::Remote { code: 500, url: "http://localhost:9998".into() },
            );
        let reconciler = CommandReconciler::new(&api);

        let err = reconciler.reconcile(&desired(Some(4), &[2])).await.unwrap_err();
        assert_eq!(err.kind, ResourceKind::Command);
        assert_eq!(err.id, Some(4));
        assert_eq!(
            err.operation,
            Operation::RemoveRelationship { kind: ResourceKind::Platform, id: 1 }
        );
        assert_eq!(
            err.applied,
            vec![Operation::AddRelationship { kind: ResourceKind::Platform, id: 2 }]
        );
        assert!(matches!(err.source, ApiError::Remote { code: 500, .. }));
        // Nothing after the failed call.
        assert_eq!(api.calls(), vec!["get 4", "add_platform 4 2", "remove_platform 4 1"]);
    }

    #[tokio::test]
    async fn failed_create_binds_no_identity() {
        let api = FakeCommandApi::default().failing_on(
            "create",
            ApiError::Remote { code: 500, url: "http://localhost:9998/command".into() },
        );
        let reconciler = CommandReconciler::new(&api);

        let err = reconciler.reconcile(&desired(None, &[1])).await.unwrap_err();
        assert_eq!(err.operation, Operation::CreateResource);
        assert_eq!(err.id, None);
        assert!(err.applied.is_empty());
    }

    #[tokio::test]
    async fn identity_bound_by_create_survives_a_later_edge_failure() {
        let api = FakeCommandApi::default().failing_on(
            "add_platform 1 2",
            ApiError::Conflict { url: "http://localhost:9998".into() },
        );
        let reconciler = CommandReconciler::new(&api);

        let err = reconciler.reconcile(&desired(None, &[1, 2])).await.unwrap_err();
        // The caller can persist the bound id and retry into an update cycle.
        assert_eq!(err.id, Some(1));
        assert_eq!(
            err.applied,
            vec![
                Operation::CreateResource,
                Operation::AddRelationship { kind: ResourceKind::Platform, id: 1 },
            ]
        );
    }

    #[tokio::test]
    async fn destroy_of_an_already_deleted_command_is_a_no_op() {
        let api = FakeCommandApi::default().with_command(existing(4, &[]));
        let reconciler = CommandReconciler::new(&api);

        reconciler.destroy(CommandId::new(4)).await.unwrap();
        // Second delete surfaces 404 from the server; mapped to a no-op.
        reconciler.destroy(CommandId::new(4)).await.unwrap();
        assert_eq!(api.calls(), vec!["delete 4", "delete 4"]);
    }
}
