//! User resource client.

use std::sync::Arc;

use serde::Serialize;

use crank_domain::{ApiError, User, UserFields, UserId};

use crate::transport::Transport;

const USER_URI: &str = "user";
const USERS_URI: &str = "users";

/// Client for user accounts.
#[derive(Debug, Clone)]
pub struct UserClient {
    transport: Arc<Transport>,
}

#[derive(Serialize)]
struct UpdatePayload<'a> {
    id: UserId,
    #[serde(flatten)]
    fields: &'a UserFields,
}

impl UserClient {
    pub fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }

    pub async fn get(&self, id: UserId) -> Result<User, ApiError> {
        self.transport.get_json(&[USER_URI, &id.to_string()]).await
    }

    pub async fn list(&self) -> Result<Vec<User>, ApiError> {
        self.transport.get_json(&[USERS_URI]).await
    }

    pub async fn create(&self, fields: &UserFields) -> Result<User, ApiError> {
        self.transport.post_json(&[USER_URI], fields).await
    }

    pub async fn update(&self, id: UserId, fields: &UserFields) -> Result<User, ApiError> {
        self.transport.post_json(&[USER_URI, "update"], &UpdatePayload { id, fields }).await
    }

    pub async fn delete(&self, id: UserId) -> Result<(), ApiError> {
        self.transport.delete(&[USER_URI, &id.to_string()]).await
    }
}
