//! Command-setting reconciliation.
//!
//! Settings are scalar-only, but two of their fields (`key`, `command_id`)
//! are immutable once created. The plan rejects a declared mutation of an
//! immutable field before any network call is made; the cycle then reports
//! it as a failed update with a validation cause.

use crank_domain::{CommandSetting, DesiredSetting, ResourceKind, SettingApi, SettingId};

use crate::error::ReconcileError;
use crate::plan::{Operation, SettingPlan};

const KIND: ResourceKind = ResourceKind::Setting;

/// Reconciles declared command settings against the server.
#[derive(Debug, Clone)]
pub struct SettingReconciler<A> {
    api: A,
}

impl<A: SettingApi> SettingReconciler<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// Runs one reconcile cycle and returns the observed state afterwards.
    pub async fn reconcile(&self, desired: &DesiredSetting) -> Result<CommandSetting, ReconcileError> {
        match desired.id {
            None => self.create(desired).await,
            Some(id) => match self.api.get(id).await {
                Ok(observed) => self.converge(desired, observed).await,
                Err(e) if e.is_not_found() => {
                    tracing::debug!(%id, "setting gone from server, re-creating");
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

    pub async fn fetch(&self, id: SettingId) -> Result<CommandSetting, ReconcileError> {
        self.api.get(id).await.map_err(|e| {
            ReconcileError::new(KIND, Operation::FetchResource, Some(id.as_i64()), Vec::new(), e)
        })
    }

    /// Deletes the remote setting; a 404 means it is already gone.
    pub async fn destroy(&self, id: SettingId) -> Result<(), ReconcileError> {
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

    async fn create(&self, desired: &DesiredSetting) -> Result<CommandSetting, ReconcileError> {
        let created = self.api.create(&desired.fields()).await.map_err(|e| {
            ReconcileError::new(KIND, Operation::CreateResource, None, Vec::new(), e)
        })?;
        self.observe(created.id, vec![Operation::CreateResource]).await
    }

    async fn converge(
        &self,
        desired: &DesiredSetting,
        observed: CommandSetting,
    ) -> Result<CommandSetting, ReconcileError> {
        let id = observed.id;
        let plan = SettingPlan::compute(desired, &observed).map_err(|e| {
            ReconcileError::new(KIND, Operation::UpdateResource, Some(id.as_i64()), Vec::new(), e)
        })?;
        let Some(fields) = &plan.update else {
            return Ok(observed);
        };
        self.api.update(id, fields).await.map_err(|e| {
            ReconcileError::new(KIND, Operation::UpdateResource, Some(id.as_i64()), Vec::new(), e)
        })?;
        self.observe(id, vec![Operation::UpdateResource]).await
    }

    /// Re-reads the setting after a mutation so the caller always receives
    /// the server's view, never a locally assembled one.
    async fn observe(
        &self,
        id: SettingId,
        applied: Vec<Operation>,
    ) -> Result<CommandSetting, ReconcileError> {
        self.api.get(id).await.map_err(|e| {
            ReconcileError::new(KIND, Operation::FetchResource, Some(id.as_i64()), applied, e)
        })
    }
}
