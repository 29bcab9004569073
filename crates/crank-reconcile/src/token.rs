//! VCS-token reconciliation.
//!
//! Tokens are write-only and keyed by platform on the server: there is no
//! read-back, no field diff, and no server-assigned id. Applying one is an
//! unconditional upsert, and the host keeps track of it through a local
//! identity token from the shared [`IdentityAllocator`].

use std::sync::Arc;

use crank_domain::{DesiredVcsToken, LocalId, ResourceKind, VcsTokenApi};

use crate::error::ReconcileError;
use crate::identity::IdentityAllocator;
use crate::plan::Operation;

const KIND: ResourceKind = ResourceKind::VcsToken;

/// Reconciles declared VCS tokens against the server.
#[derive(Debug, Clone)]
pub struct VcsTokenReconciler<A> {
    api: A,
    identity: Arc<IdentityAllocator>,
}

impl<A: VcsTokenApi> VcsTokenReconciler<A> {
    pub fn new(api: A, identity: Arc<IdentityAllocator>) -> Self {
        Self { api, identity }
    }

    /// Upserts the token for its platform and returns the local identity
    /// token allocated for this declaration.
    ///
    /// The server accepting the upsert is the only observable outcome; a
    /// repeated apply with the same declaration is safe and converges to the
    /// same remote state.
    pub async fn reconcile(&self, desired: &DesiredVcsToken) -> Result<LocalId, ReconcileError> {
        self.api.create(&desired.payload()).await.map_err(|e| {
            ReconcileError::new(KIND, Operation::CreateResource, None, Vec::new(), e)
        })?;
        Ok(self.identity.allocate())
    }
}
