//! Command resource client.
//!
//! Covers the command CRUD endpoints plus the relationship edges to
//! platforms and repositories. Edges are written one at a time through the
//! dedicated endpoints — never as part of a create or update payload — so a
//! failed edge write is independently retriable.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crank_domain::{
    ApiError, Command, CommandApi, CommandFields, CommandId, PlatformId, RepositoryId,
};

use crate::transport::Transport;

const COMMAND_URI: &str = "command";
const COMMANDS_URI: &str = "commands";
const ADD_PLATFORM_REL_URI: &str = "add-command-rel-to-platform";
const REMOVE_PLATFORM_REL_URI: &str = "remove-command-rel-to-platform";
const ADD_REPOSITORY_REL_URI: &str = "add-command-rel-to-repository";
const REMOVE_REPOSITORY_REL_URI: &str = "remove-command-rel-to-repository";

/// Client for command resources.
#[derive(Debug, Clone)]
pub struct CommandClient {
    transport: Arc<Transport>,
}

impl CommandClient {
    pub fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }
}

#[derive(Serialize)]
struct UpdatePayload<'a> {
    id: CommandId,
    #[serde(flatten)]
    fields: &'a CommandFields,
}

#[async_trait]
impl CommandApi for CommandClient {
    async fn get(&self, id: CommandId) -> Result<Command, ApiError> {
        self.transport.get_json(&[COMMAND_URI, &id.to_string()]).await
    }

    async fn list(&self) -> Result<Vec<Command>, ApiError> {
        self.transport.get_json(&[COMMANDS_URI]).await
    }

    async fn create(&self, fields: &CommandFields) -> Result<Command, ApiError> {
        self.transport.post_json(&[COMMAND_URI], fields).await
    }

    async fn update(&self, id: CommandId, fields: &CommandFields) -> Result<Command, ApiError> {
        self.transport
            .post_json(&[COMMAND_URI, "update"], &UpdatePayload { id, fields })
            .await
    }

    async fn delete(&self, id: CommandId) -> Result<(), ApiError> {
        self.transport.delete(&[COMMAND_URI, &id.to_string()]).await
    }

    async fn add_platform(&self, id: CommandId, platform: PlatformId) -> Result<(), ApiError> {
        self.transport
            .post_empty::<()>(
                &[COMMAND_URI, ADD_PLATFORM_REL_URI, &id.to_string(), &platform.to_string()],
                None,
            )
            .await
    }

    async fn remove_platform(&self, id: CommandId, platform: PlatformId) -> Result<(), ApiError> {
        self.transport
            .post_empty::<()>(
                &[COMMAND_URI, REMOVE_PLATFORM_REL_URI, &id.to_string(), &platform.to_string()],
                None,
            )
            .await
    }

    async fn add_repository(
        &self,
        id: CommandId,
        repository: RepositoryId,
    ) -> Result<(), ApiError> {
        self.transport
            .post_empty::<()>(
                &[COMMAND_URI, ADD_REPOSITORY_REL_URI, &id.to_string(), &repository.to_string()],
                None,
            )
            .await
    }

    async fn remove_repository(
        &self,
        id: CommandId,
        repository: RepositoryId,
    ) -> Result<(), ApiError> {
        self.transport
            .post_empty::<()>(
                &[
                    COMMAND_URI,
                    REMOVE_REPOSITORY_REL_URI,
                    &id.to_string(),
                    &repository.to_string(),
                ],
                None,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> CommandClient {
        let config = Config::new(server.uri(), "kid", "ksecret", "op@example.com");
        CommandClient::new(Arc::new(Transport::new(&config).unwrap()))
    }

    #[tokio::test]
    async fn get_returns_fully_populated_relationship_lists() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/command/3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 3,
                "name": "notify",
                "image": "crank-hq/notify:v1",
                "enabled": true,
                "platforms": [{"id": 1, "name": "github"}, {"id": 2, "name": "gitlab"}],
                "repositories": [{"id": 9, "name": "infra", "url": "https://g/h", "vcs": 1}]
            })))
            .mount(&server)
            .await;

        let command = client_for(&server).await.get(CommandId::new(3)).await.unwrap();
        assert_eq!(command.platform_ids().len(), 2);
        assert_eq!(command.repository_ids().len(), 1);
    }

    #[tokio::test]
    async fn create_sends_scalar_fields_only() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/command"))
            .and(body_json(json!({
                "name": "notify",
                "image": "crank-hq/notify:v1",
                "enabled": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 11, "name": "notify", "image": "crank-hq/notify:v1", "enabled": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let fields = CommandFields {
            name: "notify".into(),
            image: "crank-hq/notify:v1".into(),
            schedule: None,
            enabled: true,
        };
        let created = client_for(&server).await.create(&fields).await.unwrap();
        assert_eq!(created.id, CommandId::new(11));
    }

    #[tokio::test]
    async fn update_carries_the_id_with_the_mutable_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/command/update"))
            .and(body_json(json!({
                "id": 11,
                "name": "notify",
                "image": "crank-hq/notify:v2",
                "enabled": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 11, "name": "notify", "image": "crank-hq/notify:v2", "enabled": false
            })))
            .expect(1)
            .mount(&server)
            .await;

        let fields = CommandFields {
            name: "notify".into(),
            image: "crank-hq/notify:v2".into(),
            schedule: None,
            enabled: false,
        };
        let updated =
            client_for(&server).await.update(CommandId::new(11), &fields).await.unwrap();
        assert!(!updated.enabled);
    }

    #[tokio::test]
    async fn relationship_conflict_is_surfaced_not_swallowed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/command/add-command-rel-to-platform/3/1"))
            .respond_with(ResponseTemplate::new(409))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .add_platform(CommandId::new(3), PlatformId::new(1))
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn delete_of_a_missing_command_reports_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/command/7"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client_for(&server).await.delete(CommandId::new(7)).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
