use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::config::{ApiKey, VendorKind};
use crate::dispatcher::Dispatcher;
use crate::intent::IntentVendor;
use crate::logger::{MessageLogMode, MessageLogger, SharedLogger};
use crate::poller::Poller;
use crate::rest::RestVendor;
use crate::store::Store;
use crate::types::*;
use crate::vendor::VendorClient;
use crate::Result;

pub const DEFAULT_SCAN_INTERVAL: Duration = Duration::from_secs(30);

type SnapshotCallback = Box<dyn Fn(&[DeviceRecord]) + Send + Sync>;

/// State shared by the polling loop and every command call.
pub(crate) struct Shared {
    pub vendor: Box<dyn VendorClient>,
    pub store: RwLock<Store>,
    pub snapshot_callbacks: Vec<SnapshotCallback>,
    pub logger: Option<SharedLogger>,
    pub refresh_after_command: bool,
}

impl Shared {
    /// Hand the current visible records to every snapshot callback.
    pub fn publish(&self) {
        let snapshot = self.store.read().visible().to_vec();
        for cb in &self.snapshot_callbacks {
            cb(&snapshot);
        }
    }

    pub fn log_command(&self, command: &Command, success: bool) {
        if let Some(ref logger) = self.logger {
            let value = serde_json::to_value(command.kind).unwrap_or(Value::Null);
            logger
                .lock()
                .log_command(command.action_name(), &command.device_id, &value, success);
        }
    }
}

pub struct ThermostatClientBuilder {
    api_key: String,
    vendor_kind: VendorKind,
    vendor: Option<Box<dyn VendorClient>>,
    base_url: Option<String>,
    http: Option<reqwest::Client>,
    scan_interval: Duration,
    snapshot_callbacks: Vec<SnapshotCallback>,
    log_mode: Option<MessageLogMode>,
    log_path: Option<String>,
    refresh_after_command: bool,
}

impl ThermostatClientBuilder {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            vendor_kind: VendorKind::default(),
            vendor: None,
            base_url: None,
            http: None,
            scan_interval: DEFAULT_SCAN_INTERVAL,
            snapshot_callbacks: Vec::new(),
            log_mode: None,
            log_path: None,
            refresh_after_command: false,
        }
    }

    pub fn vendor(mut self, kind: VendorKind) -> Self {
        self.vendor_kind = kind;
        self
    }

    /// Use a caller-supplied protocol implementation instead of the
    /// built-in ones. The API key is not parsed in that case.
    pub fn vendor_client(mut self, vendor: impl VendorClient + 'static) -> Self {
        self.vendor = Some(Box::new(vendor));
        self
    }

    /// Override the region URL derived from the API key.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Share an existing HTTP session (connection pool, timeouts).
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    pub fn scan_interval(mut self, interval: Duration) -> Self {
        self.scan_interval = interval;
        self
    }

    pub fn on_snapshot(mut self, f: impl Fn(&[DeviceRecord]) + Send + Sync + 'static) -> Self {
        self.snapshot_callbacks.push(Box::new(f));
        self
    }

    pub fn message_log(mut self, mode: MessageLogMode, path: impl Into<String>) -> Self {
        self.log_mode = Some(mode);
        self.log_path = Some(path.into());
        self
    }

    /// Poll once after every confirmed command.
    pub fn refresh_after_command(mut self, enabled: bool) -> Self {
        self.refresh_after_command = enabled;
        self
    }

    pub fn build(self) -> Result<ThermostatClient> {
        let logger: Option<SharedLogger> = match (self.log_mode, &self.log_path) {
            (Some(mode), Some(path)) => {
                Some(Arc::new(Mutex::new(MessageLogger::new(mode, path)?)))
            }
            _ => None,
        };

        let vendor = match self.vendor {
            Some(vendor) => vendor,
            None => {
                let key = ApiKey::parse(&self.api_key)?;
                let http = match self.http {
                    Some(http) => http,
                    None => reqwest::Client::builder().build()?,
                };
                let url = self
                    .base_url
                    .unwrap_or_else(|| key.region().base_url().to_string());
                debug!(
                    url = %url,
                    region = ?key.region(),
                    vendor = ?self.vendor_kind,
                    "building client"
                );
                match self.vendor_kind {
                    VendorKind::Rest => Box::new(
                        RestVendor::new(http, &url, key.token())?.with_message_log(logger.clone()),
                    ) as Box<dyn VendorClient>,
                    VendorKind::Intent => Box::new(
                        IntentVendor::new(http, &url, key.token()).with_message_log(logger.clone()),
                    ),
                }
            }
        };

        Ok(ThermostatClient {
            shared: Arc::new(Shared {
                vendor,
                store: RwLock::new(Store::default()),
                snapshot_callbacks: self.snapshot_callbacks,
                logger,
                refresh_after_command: self.refresh_after_command,
            }),
            scan_interval: self.scan_interval,
        })
    }
}

/// Handle to a set of cloud thermostats. Clones share state, so one clone
/// can run the polling loop while others issue commands.
#[derive(Clone)]
pub struct ThermostatClient {
    shared: Arc<Shared>,
    scan_interval: Duration,
}

impl ThermostatClient {
    pub fn builder(api_key: impl Into<String>) -> ThermostatClientBuilder {
        ThermostatClientBuilder::new(api_key)
    }

    /// Fetch every device and its status. On error the previous records
    /// stay visible.
    pub async fn poll(&self) -> Result<()> {
        Poller::new(&self.shared).poll().await
    }

    /// Poll on the configured interval forever. Failed polls are logged and
    /// retried on the next tick.
    pub async fn run_polling(&self) {
        let mut ticker = tokio::time::interval(self.scan_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(e) = self.poll().await {
                debug!(error = %e, "poll failed, retrying on next tick");
            }
        }
    }

    pub fn scan_interval(&self) -> Duration {
        self.scan_interval
    }

    pub fn capabilities(&self) -> Capabilities {
        self.shared.vendor.capabilities()
    }

    pub fn devices(&self) -> Vec<DeviceRecord> {
        self.shared.store.read().visible().to_vec()
    }

    pub fn device(&self, device_id: &str) -> Option<DeviceRecord> {
        self.shared.store.read().find(device_id).cloned()
    }

    // -- Command methods --

    /// Set the target temperature. Rounded to the vendor step and clamped
    /// to the device range before sending. NaN and infinities are refused.
    pub async fn set_temperature(&self, device_id: &str, temp: Temperature) -> bool {
        Dispatcher::new(&self.shared).set_temperature(device_id, temp).await
    }

    /// Set the low/high setpoint pair. Both ends are rounded and clamped;
    /// fails when `low` ends up above `high` or the vendor has no pair.
    pub async fn set_temperature_range(
        &self,
        device_id: &str,
        low: Temperature,
        high: Temperature,
    ) -> bool {
        Dispatcher::new(&self.shared)
            .set_temperature_range(device_id, low, high)
            .await
    }

    pub async fn set_hvac_mode(&self, device_id: &str, mode: HvacMode) -> bool {
        Dispatcher::new(&self.shared).set_hvac_mode(device_id, mode).await
    }

    pub async fn set_preset_mode(&self, device_id: &str, preset: Preset) -> bool {
        Dispatcher::new(&self.shared).set_preset_mode(device_id, preset).await
    }
}
