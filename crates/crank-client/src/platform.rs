//! Supported-platform client.
//!
//! The platform table is server-owned and read-only from the client side.

use std::sync::Arc;

use async_trait::async_trait;

use crank_domain::{ApiError, Platform, PlatformApi, PlatformId};

use crate::transport::Transport;

const PLATFORM_URI: &str = "supported-platform";
const PLATFORMS_URI: &str = "supported-platforms";

/// Client for the supported-platform table.
#[derive(Debug, Clone)]
pub struct PlatformClient {
    transport: Arc<Transport>,
}

impl PlatformClient {
    pub fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl PlatformApi for PlatformClient {
    async fn get(&self, id: PlatformId) -> Result<Platform, ApiError> {
        self.transport.get_json(&[PLATFORM_URI, &id.to_string()]).await
    }

    async fn list(&self) -> Result<Vec<Platform>, ApiError> {
        self.transport.get_json(&[PLATFORMS_URI]).await
    }
}
