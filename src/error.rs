use std::fmt;

#[derive(Debug)]
pub enum Error {
    Http(reqwest::Error),
    Status { code: u16, body: String },
    Protocol(String),
    UnsupportedMode(String),
    UnsupportedPreset(String),
    UnsupportedCommand(&'static str),
    InvalidTemperature(String),
    UnknownDevice(String),
    Rejected(String),
    InvalidApiKey,
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Http(e) => write!(f, "HTTP error: {e}"),
            Error::Status { code, body } => write!(f, "API error {code}: {body}"),
            Error::Protocol(msg) => write!(f, "protocol error: {msg}"),
            Error::UnsupportedMode(mode) => write!(f, "unsupported mode: {mode}"),
            Error::UnsupportedPreset(preset) => write!(f, "unsupported preset: {preset}"),
            Error::UnsupportedCommand(action) => write!(f, "unsupported command: {action}"),
            Error::InvalidTemperature(msg) => write!(f, "invalid temperature: {msg}"),
            Error::UnknownDevice(id) => write!(f, "unknown device: {id}"),
            Error::Rejected(msg) => write!(f, "command rejected: {msg}"),
            Error::InvalidApiKey => write!(f, "invalid API key"),
            Error::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Http(e) => Some(e),
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Http(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Protocol(e.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
