use async_trait::async_trait;
use serde_json::Value;

use crate::types::{Capabilities, Command, DeviceInfo, DeviceStatus};
use crate::{Error, Result};

/// One vendor cloud protocol. The poller and dispatcher only talk to this.
#[async_trait]
pub trait VendorClient: Send + Sync {
    /// Modes and presets the dispatcher may send to this vendor.
    fn capabilities(&self) -> Capabilities;

    async fn list_devices(&self) -> Result<Vec<DeviceInfo>>;

    async fn get_status(&self, device_id: &str) -> Result<DeviceStatus>;

    /// `Ok` only when the vendor confirmed the command.
    async fn send_command(&self, command: &Command) -> Result<()>;
}

/// Turn a non-2xx response into `Error::Status`, otherwise parse the body.
pub(crate) async fn json_body(resp: reqwest::Response) -> Result<Value> {
    let resp = check_status(resp).await?;
    let body = resp.text().await?;
    Ok(serde_json::from_str(&body)?)
}

pub(crate) async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(Error::Status {
        code: status.as_u16(),
        body,
    })
}
