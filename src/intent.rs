use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, trace};

use crate::logger::SharedLogger;
use crate::protocol::{
    INTENT_PATH, execute_request, intent_command, parse_execute_response, parse_query_response,
    parse_sync_response, query_request, sync_request,
};
use crate::types::*;
use crate::vendor::{VendorClient, json_body};
use crate::Result;

/// Smart-home intent API: every call is a POST of a SYNC, QUERY or EXECUTE
/// envelope to one endpoint, authenticated with `Authorization: Bearer`.
pub struct IntentVendor {
    http: reqwest::Client,
    url: String,
    token: String,
    logger: Option<SharedLogger>,
}

impl IntentVendor {
    pub fn new(http: reqwest::Client, api_url: &str, token: &str) -> Self {
        Self {
            http,
            url: format!("{}{}", api_url.trim_end_matches('/'), INTENT_PATH),
            token: token.to_string(),
            logger: None,
        }
    }

    pub(crate) fn with_message_log(mut self, logger: Option<SharedLogger>) -> Self {
        self.logger = logger;
        self
    }

    async fn post(&self, envelope: &Value) -> Result<Value> {
        trace!(url = %self.url, request_id = %envelope["requestId"], "posting intent");
        if let Some(ref logger) = self.logger {
            logger.lock().log_request("POST", INTENT_PATH, Some(envelope));
        }
        let resp = self
            .http
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(envelope)
            .send()
            .await?;
        json_body(resp).await
    }
}

#[async_trait]
impl VendorClient for IntentVendor {
    fn capabilities(&self) -> Capabilities {
        Capabilities {
            hvac_modes: vec![HvacMode::Auto, HvacMode::Heat, HvacMode::Off],
            presets: vec![Preset::Home, Preset::Away],
            temp_step: TEMP_STEP_C,
            temp_range: false,
            mode_encodes_preset: true,
        }
    }

    async fn list_devices(&self) -> Result<Vec<DeviceInfo>> {
        debug!(url = %self.url, "SYNC");
        let body = self.post(&sync_request()).await?;
        parse_sync_response(&body)
    }

    async fn get_status(&self, device_id: &str) -> Result<DeviceStatus> {
        let body = self.post(&query_request(device_id)).await?;
        parse_query_response(&body, device_id)
    }

    async fn send_command(&self, command: &Command) -> Result<()> {
        let (name, params) = intent_command(command)?;
        debug!(device = %command.device_id, command = name, params = %params, "EXECUTE");
        let body = self
            .post(&execute_request(&command.device_id, name, params))
            .await?;
        parse_execute_response(&body)
    }
}
