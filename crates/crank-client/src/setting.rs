//! Command-setting resource client.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crank_domain::{ApiError, CommandId, CommandSetting, SettingApi, SettingFields, SettingId};

use crate::transport::Transport;

const COMMAND_URI: &str = "command";
const SETTING_URI: &str = "setting";
const SETTINGS_URI: &str = "settings";

/// Client for command settings.
#[derive(Debug, Clone)]
pub struct SettingClient {
    transport: Arc<Transport>,
}

impl SettingClient {
    pub fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }
}

#[derive(Serialize)]
struct UpdatePayload<'a> {
    id: SettingId,
    #[serde(flatten)]
    fields: &'a SettingFields,
}

#[async_trait]
impl SettingApi for SettingClient {
    async fn get(&self, id: SettingId) -> Result<CommandSetting, ApiError> {
        self.transport.get_json(&[COMMAND_URI, SETTING_URI, &id.to_string()]).await
    }

    async fn list_for_command(
        &self,
        command: CommandId,
    ) -> Result<Vec<CommandSetting>, ApiError> {
        self.transport.get_json(&[COMMAND_URI, &command.to_string(), SETTINGS_URI]).await
    }

    async fn create(&self, fields: &SettingFields) -> Result<CommandSetting, ApiError> {
        self.transport.post_json(&[COMMAND_URI, SETTING_URI], fields).await
    }

    async fn update(
        &self,
        id: SettingId,
        fields: &SettingFields,
    ) -> Result<CommandSetting, ApiError> {
        self.transport
            .post_json(&[COMMAND_URI, SETTING_URI, "update"], &UpdatePayload { id, fields })
            .await
    }

    async fn delete(&self, id: SettingId) -> Result<(), ApiError> {
        self.transport.delete(&[COMMAND_URI, SETTING_URI, &id.to_string()]).await
    }
}
