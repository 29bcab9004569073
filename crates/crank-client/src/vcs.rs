//! VCS-token client.
//!
//! Tokens are keyed by platform on the server and carry no remote identity;
//! creating a token for a platform that already has one replaces it.

use std::sync::Arc;

use async_trait::async_trait;

use crank_domain::{ApiError, VcsToken, VcsTokenApi};

use crate::transport::Transport;

const VCS_TOKEN_URI: &str = "vcs-token";

/// Client for VCS tokens.
#[derive(Debug, Clone)]
pub struct VcsTokenClient {
    transport: Arc<Transport>,
}

impl VcsTokenClient {
    pub fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl VcsTokenApi for VcsTokenClient {
    async fn create(&self, token: &VcsToken) -> Result<(), ApiError> {
        self.transport.post_empty(&[VCS_TOKEN_URI], Some(token)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crank_domain::PlatformId;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn create_posts_the_token_for_its_platform() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/vcs-token"))
            .and(body_json(json!({"token": "gh-token", "vcs": 1})))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let config = Config::new(server.uri(), "kid", "ksecret", "op@example.com");
        let client = VcsTokenClient::new(Arc::new(Transport::new(&config).unwrap()));
        let token = VcsToken { token: "gh-token".into(), vcs: PlatformId::new(1) };
        client.create(&token).await.unwrap();
    }
}
