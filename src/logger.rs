use std::fs::{File, OpenOptions};
use std::io::Write;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tracing::warn;

use crate::types::DeviceRecord;

/// How poll results are written to the message log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLogMode {
    /// Every poll writes the whole device list.
    Full,
    /// First poll writes the whole list, later polls only changed records.
    Diffed,
}

/// One log file shared by the client and its vendor.
pub(crate) type SharedLogger = Arc<Mutex<MessageLogger>>;

pub(crate) struct MessageLogger {
    mode: MessageLogMode,
    file: File,
    previous: Option<Vec<DeviceRecord>>,
}

impl MessageLogger {
    pub fn new(mode: MessageLogMode, path: &str) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            mode,
            file,
            previous: None,
        })
    }

    pub fn log_request(&mut self, method: &str, path: &str, body: Option<&Value>) {
        let entry = json!({
            "ts": Utc::now().to_rfc3339(),
            "dir": "req",
            "method": method,
            "path": path,
            "body": body,
        });
        self.write_line(&entry);
    }

    pub fn log_command(&mut self, action: &str, device_id: &str, value: &Value, success: bool) {
        let entry = json!({
            "ts": Utc::now().to_rfc3339(),
            "dir": "cmd",
            "action": action,
            "device": device_id,
            "value": value,
            "success": success,
        });
        self.write_line(&entry);
    }

    pub fn log_poll_error(&mut self, error: &str) {
        let entry = json!({
            "ts": Utc::now().to_rfc3339(),
            "dir": "poll",
            "ok": false,
            "error": error,
        });
        self.write_line(&entry);
    }

    pub fn log_poll(&mut self, records: &[DeviceRecord]) {
        let entry = match (self.mode, self.previous.as_deref()) {
            (MessageLogMode::Diffed, Some(prev)) => {
                let changed: Vec<&DeviceRecord> = records
                    .iter()
                    .filter(|r| !prev.contains(r))
                    .collect();
                let removed: Vec<&str> = prev
                    .iter()
                    .filter(|p| !records.iter().any(|r| r.device_id == p.device_id))
                    .map(|p| p.device_id.as_str())
                    .collect();
                json!({
                    "ts": Utc::now().to_rfc3339(),
                    "dir": "poll",
                    "ok": true,
                    "changes": changed,
                    "removed": removed,
                })
            }
            _ => json!({
                "ts": Utc::now().to_rfc3339(),
                "dir": "poll",
                "ok": true,
                "full": true,
                "devices": records,
            }),
        };
        self.write_line(&entry);
        if self.mode == MessageLogMode::Diffed {
            self.previous = Some(records.to_vec());
        }
    }

    fn write_line(&mut self, entry: &Value) {
        if let Ok(line) = serde_json::to_string(entry)
            && let Err(e) = writeln!(self.file, "{line}")
        {
            warn!("failed to write log entry: {e}");
        }
    }
}
