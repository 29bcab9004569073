//! Hook-event client (read-only; events are recorded by the server).

use std::sync::Arc;

use crank_domain::{ApiError, Event, EventId, RepositoryId};

use crate::transport::Transport;

const EVENT_URI: &str = "event";
const EVENTS_URI: &str = "events";

/// Client for received hook events.
#[derive(Debug, Clone)]
pub struct EventClient {
    transport: Arc<Transport>,
}

impl EventClient {
    pub fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }

    pub async fn get(&self, id: EventId) -> Result<Event, ApiError> {
        self.transport.get_json(&[EVENT_URI, &id.to_string()]).await
    }

    pub async fn list_for_repository(
        &self,
        repository: RepositoryId,
    ) -> Result<Vec<Event>, ApiError> {
        self.transport.get_json(&[EVENTS_URI, &repository.to_string()]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn list_addresses_the_repository_namespace() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/events/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "id": 3,
                    "repository_id": 7,
                    "vcs": 1,
                    "payload": "{\"ref\":\"refs/heads/main\"}",
                    "created_at": "2026-08-27T12:00:00Z",
                    "command_runs": []
                }
            ])))
            .mount(&server)
            .await;

        let config = Config::new(server.uri(), "kid", "ksecret", "op@example.com");
        let client = EventClient::new(Arc::new(Transport::new(&config).unwrap()));
        let events = client.list_for_repository(RepositoryId::new(7)).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, EventId::new(3));
        assert!(events[0].command_runs.is_empty());
    }
}
