//! Repository resource client.
//!
//! The command list on a fetched repository is a server-owned projection of
//! the command↔repository edge; the edge itself is written from the command
//! side.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crank_domain::{ApiError, Repository, RepositoryApi, RepositoryFields, RepositoryId};

use crate::transport::Transport;

const REPOSITORY_URI: &str = "repository";
const REPOSITORIES_URI: &str = "repositories";

/// Client for repository resources.
#[derive(Debug, Clone)]
pub struct RepositoryClient {
    transport: Arc<Transport>,
}

impl RepositoryClient {
    pub fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }
}

#[derive(Serialize)]
struct UpdatePayload<'a> {
    id: RepositoryId,
    #[serde(flatten)]
    fields: &'a RepositoryFields,
}

#[async_trait]
impl RepositoryApi for RepositoryClient {
    async fn get(&self, id: RepositoryId) -> Result<Repository, ApiError> {
        self.transport.get_json(&[REPOSITORY_URI, &id.to_string()]).await
    }

    async fn list(&self) -> Result<Vec<Repository>, ApiError> {
        self.transport.get_json(&[REPOSITORIES_URI]).await
    }

    async fn create(&self, fields: &RepositoryFields) -> Result<Repository, ApiError> {
        self.transport.post_json(&[REPOSITORY_URI], fields).await
    }

    async fn update(
        &self,
        id: RepositoryId,
        fields: &RepositoryFields,
    ) -> Result<Repository, ApiError> {
        self.transport
            .post_json(&[REPOSITORY_URI, "update"], &UpdatePayload { id, fields })
            .await
    }

    async fn delete(&self, id: RepositoryId) -> Result<(), ApiError> {
        self.transport.delete(&[REPOSITORY_URI, &id.to_string()]).await
    }
}
