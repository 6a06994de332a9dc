use std::fmt;

use crate::{Error, Result};

pub const CN_URL: &str = "https://open2.poersmart.com";
pub const EU_URL: &str = "https://open.poersmart.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Region {
    Cn,
    #[default]
    Eu,
}

impl Region {
    pub fn base_url(&self) -> &'static str {
        match self {
            Region::Cn => CN_URL,
            Region::Eu => EU_URL,
        }
    }

    fn prefix(&self) -> &'static str {
        match self {
            Region::Cn => "cn-",
            Region::Eu => "eu-",
        }
    }
}

/// Which vendor API a device account speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VendorKind {
    /// Per-device REST endpoints, `token` header.
    #[default]
    Rest,
    /// Single SYNC/QUERY/EXECUTE endpoint, bearer token.
    Intent,
}

/// API key with its region prefix stripped.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey {
    region: Region,
    token: String,
}

impl ApiKey {
    /// Parse `cn-<token>` / `eu-<token>` (case-insensitive prefix).
    /// A key without a known prefix is an EU key used as-is.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let (region, token) = [Region::Cn, Region::Eu]
            .into_iter()
            .find_map(|region| {
                let prefix = region.prefix();
                raw.get(..prefix.len())
                    .filter(|head| head.eq_ignore_ascii_case(prefix))
                    .map(|_| (region, &raw[prefix.len()..]))
            })
            .unwrap_or((Region::Eu, raw));

        if token.is_empty() {
            return Err(Error::InvalidApiKey);
        }
        Ok(Self {
            region,
            token: token.to_string(),
        })
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKey")
            .field("region", &self.region)
            .field("token", &"<redacted>")
            .finish()
    }
}
