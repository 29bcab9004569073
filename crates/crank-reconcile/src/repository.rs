//! Repository reconciliation.
//!
//! Simpler than the command cycle: repositories carry no client-managed
//! relationship sets, so a cycle is at most a create or a field update
//! followed by a fresh read.

use crank_domain::{DesiredRepository, Repository, RepositoryApi, RepositoryId, ResourceKind};

use crate::error::ReconcileError;
use crate::plan::{Operation, RepositoryPlan};

const KIND: ResourceKind = ResourceKind::Repository;

/// Reconciles declared repositories against the server.
#[derive(Debug, Clone)]
pub struct RepositoryReconciler<A> {
    api: A,
}

impl<A: RepositoryApi> RepositoryReconciler<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// Runs one reconcile cycle and returns the observed state afterwards.
    pub async fn reconcile(&self, desired: &DesiredRepository) -> Result<Repository, ReconcileError> {
        match desired.id {
            None => self.create(desired).await,
            Some(id) => match self.api.get(id).await {
                Ok(observed) => self.converge(desired, observed).await,
                Err(e) if e.is_not_found() => {
                    tracing::debug!(%id, "repository gone from server, re-creating");
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

    pub async fn fetch(&self, id: RepositoryId) -> Result<Repository, ReconcileError> {
        self.api.get(id).await.map_err(|e| {
            ReconcileError::new(KIND, Operation::FetchResource, Some(id.as_i64()), Vec::new(), e)
        })
    }

    /// Deletes the remote repository; a 404 means it is already gone.
    pub async fn destroy(&self, id: RepositoryId) -> Result<(), ReconcileError> {
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

    async fn create(&self, desired: &DesiredRepository) -> Result<Repository, ReconcileError> {
        let created = self.api.create(&desired.fields()).await.map_err(|e| {
            ReconcileError::new(KIND, Operation::CreateResource, None, Vec::new(), e)
        })?;
        self.observe(created.id, vec![Operation::CreateResource]).await
    }

    async fn converge(
        &self,
        desired: &DesiredRepository,
        observed: Repository,
    ) -> Result<Repository, ReconcileError> {
        let plan = RepositoryPlan::compute(desired, &observed);
        let Some(fields) = &plan.update else {
            return Ok(observed);
        };
        let id = observed.id;
        self.api.update(id, fields).await.map_err(|e| {
            ReconcileError::new(KIND, Operation::UpdateResource, Some(id.as_i64()), Vec::new(), e)
        })?;
        self.observe(id, vec![Operation::UpdateResource]).await
    }

    /// Re-reads the repository after a mutation so the caller always
    /// receives the server's view, never a locally assembled one.
    async fn observe(
        &self,
        id: RepositoryId,
        applied: Vec<Operation>,
    ) -> Result<Repository, ReconcileError> {
        self.api.get(id).await.map_err(|e| {
            ReconcileError::new(KIND, Operation::FetchResource, Some(id.as_i64()), applied, e)
        })
    }
}
