//! API-key client.
//!
//! Keys are scoped to a user; the secret half of a pair is only present in
//! the create response.

use std::sync::Arc;

use crank_domain::{ApiError, ApiKey, ApiKeyId, UserId};

use crate::transport::Transport;

const USER_URI: &str = "user";
const APIKEY_URI: &str = "apikey";
const APIKEYS_URI: &str = "apikeys";

/// Client for user API keys.
#[derive(Debug, Clone)]
pub struct ApiKeyClient {
    transport: Arc<Transport>,
}

impl ApiKeyClient {
    pub fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }

    pub async fn get(&self, user: UserId, id: ApiKeyId) -> Result<ApiKey, ApiError> {
        self.transport
            .get_json(&[USER_URI, APIKEY_URI, &user.to_string(), &id.to_string()])
            .await
    }

    pub async fn list(&self, user: UserId) -> Result<Vec<ApiKey>, ApiError> {
        self.transport.get_json(&[USER_URI, APIKEYS_URI, &user.to_string()]).await
    }

    /// Generates a new key pair for the user. The returned record is the
    /// only place the secret ever appears.
    pub async fn create(&self, user: UserId, name: &str) -> Result<ApiKey, ApiError> {
        self.transport
            .post_json(
                &[USER_URI, APIKEY_URI, "generate", &user.to_string(), name],
                &(),
            )
            .await
    }

    pub async fn delete(&self, user: UserId, id: ApiKeyId) -> Result<(), ApiError> {
        self.transport
            .delete(&[USER_URI, APIKEY_URI, &user.to_string(), &id.to_string()])
            .await
    }
}
