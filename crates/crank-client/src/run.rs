//! Command-run client (read-only; runs are produced by the server).

use std::sync::Arc;

use crank_domain::{ApiError, Run, RunId};

use crate::transport::Transport;

const RUN_URI: &str = "run";
const RUNS_URI: &str = "runs";

/// Client for command runs.
#[derive(Debug, Clone)]
pub struct RunClient {
    transport: Arc<Transport>,
}

impl RunClient {
    pub fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }

    pub async fn get(&self, id: RunId) -> Result<Run, ApiError> {
        self.transport.get_json(&[RUN_URI, &id.to_string()]).await
    }

    pub async fn list(&self) -> Result<Vec<Run>, ApiError> {
        self.transport.get_json(&[RUNS_URI]).await
    }
}
