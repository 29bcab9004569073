//! Vault-secret client.
//!
//! Secrets are addressed by key, not by integer id; the list endpoint
//! returns key names only.

use std::sync::Arc;

use crank_domain::{ApiError, VaultSecret};

use crate::transport::Transport;

const VAULT_URI: &str = "vault";
const SECRET_URI: &str = "secret";
const SECRETS_URI: &str = "secrets";

/// Client for vault secrets.
#[derive(Debug, Clone)]
pub struct VaultClient {
    transport: Arc<Transport>,
}

impl VaultClient {
    pub fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }

    pub async fn get(&self, key: &str) -> Result<VaultSecret, ApiError> {
        self.transport.get_json(&[VAULT_URI, SECRET_URI, key]).await
    }

    pub async fn list(&self) -> Result<Vec<String>, ApiError> {
        self.transport.get_json(&[VAULT_URI, SECRETS_URI]).await
    }

    pub async fn create(&self, secret: &VaultSecret) -> Result<(), ApiError> {
        self.transport.post_empty(&[VAULT_URI, SECRET_URI], Some(secret)).await
    }

    pub async fn update(&self, secret: &VaultSecret) -> Result<(), ApiError> {
        self.transport.post_empty(&[VAULT_URI, SECRET_URI, "update"], Some(secret)).await
    }

    pub async fn delete(&self, key: &str) -> Result<(), ApiError> {
        self.transport.delete(&[VAULT_URI, SECRET_URI, key]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn create_posts_the_secret_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/vault/secret"))
            .and(body_json(json!({"key": "HOOK_SECRET", "value": "s3cret"})))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let config = Config::new(server.uri(), "kid", "ksecret", "op@example.com");
        let client = VaultClient::new(Arc::new(Transport::new(&config).unwrap()));
        let secret = VaultSecret { key: "HOOK_SECRET".into(), value: "s3cret".into() };
        client.create(&secret).await.unwrap();
    }
}
