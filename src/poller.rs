use tracing::{debug, error, warn};

use crate::client::Shared;
use crate::types::DeviceRecord;
use crate::vendor::VendorClient;
use crate::Result;

pub(crate) struct Poller<'a> {
    shared: &'a Shared,
}

impl<'a> Poller<'a> {
    pub fn new(shared: &'a Shared) -> Self {
        Self { shared }
    }

    pub async fn poll(&self) -> Result<()> {
        let records = match fetch_records(self.shared.vendor.as_ref()).await {
            Ok(records) => records,
            Err(e) => {
                error!(error = %e, "update failed, keeping previous devices");
                if let Some(ref logger) = self.shared.logger {
                    logger.lock().log_poll_error(&e.to_string());
                }
                return Err(e);
            }
        };

        debug!(count = records.len(), "poll complete");
        if let Some(ref logger) = self.shared.logger {
            logger.lock().log_poll(&records);
        }
        self.shared.store.write().replace(records);
        self.shared.publish();
        Ok(())
    }
}

/// Device list, then one status fetch per device. A failed device list
/// fails the poll; a failed status only degrades that one record.
pub(crate) async fn fetch_records(vendor: &dyn VendorClient) -> Result<Vec<DeviceRecord>> {
    let devices = vendor.list_devices().await?;

    let mut records = Vec::with_capacity(devices.len());
    for info in devices {
        let status = match vendor.get_status(&info.device_id).await {
            Ok(status) => Some(status),
            Err(e) => {
                warn!(device = %info.device_id, error = %e, "failed to get status");
                None
            }
        };
        records.push(DeviceRecord::merge(info, status));
    }
    Ok(records)
}
