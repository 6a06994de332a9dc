mod client;
mod config;
mod dispatcher;
mod error;
mod intent;
mod logger;
mod poller;
mod protocol;
mod rest;
mod store;
mod translate;
mod types;
mod vendor;

pub use client::{DEFAULT_SCAN_INTERVAL, ThermostatClient, ThermostatClientBuilder};
pub use config::{ApiKey, CN_URL, EU_URL, Region, VendorKind};
pub use error::{Error, Result};
pub use intent::IntentVendor;
pub use logger::MessageLogMode;
pub use rest::{RestVendor, TOKEN_HEADER};
pub use types::*;
pub use vendor::VendorClient;
