use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::{debug, trace};

use crate::logger::SharedLogger;
use crate::protocol::{API_PREFIX, parse_device_list, parse_rest_status, rest_command};
use crate::types::*;
use crate::vendor::{VendorClient, check_status, json_body};
use crate::{Error, Result};

/// Header carrying the raw token, no scheme prefix.
pub const TOKEN_HEADER: &str = "token";

/// Per-device REST API: `GET devices`, `GET devices/{id}/status`,
/// `POST devices/{id}/set_*`.
pub struct RestVendor {
    http: reqwest::Client,
    root: String,
    headers: HeaderMap,
    logger: Option<SharedLogger>,
}

impl RestVendor {
    pub fn new(http: reqwest::Client, api_url: &str, token: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            TOKEN_HEADER,
            HeaderValue::from_str(token).map_err(|_| Error::InvalidApiKey)?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(Self {
            http,
            root: api_url.trim_end_matches('/').to_string(),
            headers,
            logger: None,
        })
    }

    pub(crate) fn with_message_log(mut self, logger: Option<SharedLogger>) -> Self {
        self.logger = logger;
        self
    }

    async fn get(&self, path: &str) -> Result<Value> {
        self.log_request("GET", path, None);
        let url = format!("{}{path}", self.root);
        trace!(url = %url, "GET");
        let resp = self.http.get(&url).headers(self.headers.clone()).send().await?;
        json_body(resp).await
    }

    fn log_request(&self, method: &str, path: &str, body: Option<&Value>) {
        if let Some(ref logger) = self.logger {
            logger.lock().log_request(method, path, body);
        }
    }
}

#[async_trait]
impl VendorClient for RestVendor {
    fn capabilities(&self) -> Capabilities {
        Capabilities {
            hvac_modes: vec![HvacMode::Auto, HvacMode::Off],
            presets: vec![Preset::None, Preset::Home, Preset::Eco],
            temp_step: TEMP_STEP_C,
            temp_range: true,
            mode_encodes_preset: false,
        }
    }

    async fn list_devices(&self) -> Result<Vec<DeviceInfo>> {
        debug!(root = %self.root, "fetching device list");
        let body = self.get(&format!("{API_PREFIX}/devices")).await?;
        parse_device_list(&body)
    }

    async fn get_status(&self, device_id: &str) -> Result<DeviceStatus> {
        let body = self
            .get(&format!("{API_PREFIX}/devices/{device_id}/status"))
            .await?;
        parse_rest_status(&body)
    }

    async fn send_command(&self, command: &Command) -> Result<()> {
        let (endpoint, body) = rest_command(command.kind);
        let path = format!("{API_PREFIX}/devices/{}/{endpoint}", command.device_id);
        self.log_request("POST", &path, Some(&body));
        let url = format!("{}{path}", self.root);
        debug!(url = %url, body = %body, "sending command");
        let resp = self
            .http
            .post(&url)
            .headers(self.headers.clone())
            .json(&body)
            .send()
            .await?;
        check_status(resp).await?;
        Ok(())
    }
}
