use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use reqwest::multipart::Form;

use crate::errors::{ClientError, ClientResult};

pub const MAX_DESCRIPTION_CHARS: usize = 1000;
/// Raw epoch values above this are taken as milliseconds, anything else as seconds.
pub const EPOCH_MILLIS_THRESHOLD: i64 = 10_000_000_000;
const MILLIS_PER_SECOND: f64 = 1000.0;

static PASSWORD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9]{6,20}$").expect("password pattern is valid"));

/// When an upload stops being available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiration {
    Seconds(i64),
    Millis(i64),
    At(DateTime<Utc>),
}

impl Expiration {
    /// Accepts an epoch of unknown unit, guessing from its magnitude.
    pub fn from_epoch(raw: i64) -> Self {
        if raw > EPOCH_MILLIS_THRESHOLD {
            Self::Millis(raw)
        } else {
            Self::Seconds(raw)
        }
    }

    /// Whole epoch seconds, rounding milliseconds to the nearest second.
    pub fn as_epoch_seconds(&self) -> i64 {
        match *self {
            Self::Seconds(secs) => secs,
            Self::Millis(millis) => (millis as f64 / MILLIS_PER_SECOND).round() as i64,
            Self::At(at) => at.timestamp(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadOptions {
    pub description: Option<String>,
    pub password: Option<String>,
    pub expire: Option<Expiration>,
}

impl UploadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn expire(mut self, expire: Expiration) -> Self {
        self.expire = Some(expire);
        self
    }

    pub fn validate(&self) -> ClientResult<ValidatedOptions> {
        self.validate_at(Utc::now())
    }

    /// Checks description, password and expiration in that order, stopping at the first
    /// invalid one.
    pub fn validate_at(&self, now: DateTime<Utc>) -> ClientResult<ValidatedOptions> {
        if let Some(description) = &self.description {
            // UTF-16 code units, the way the service measures text
            if description.encode_utf16().count() > MAX_DESCRIPTION_CHARS {
                return Err(ClientError::InvalidOption {
                    field: "description",
                });
            }
        }

        if let Some(password) = &self.password {
            if !PASSWORD_PATTERN.is_match(password) {
                return Err(ClientError::InvalidOption { field: "password" });
            }
        }

        let expire = match self.expire {
            Some(expire) => {
                let secs = expire.as_epoch_seconds();
                if secs <= now.timestamp() {
                    return Err(ClientError::InvalidOption { field: "expire" });
                }
                Some(secs)
            }
            None => None,
        };

        Ok(ValidatedOptions {
            description: self.description.clone(),
            password: self.password.clone(),
            expire,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatedOptions {
    pub description: Option<String>,
    pub password: Option<String>,
    pub expire: Option<i64>,
}

impl ValidatedOptions {
    pub(crate) fn apply(self, mut form: Form) -> Form {
        if let Some(description) = self.description {
            form = form.text("description", description);
        }
        if let Some(password) = self.password {
            form = form.text("password", password);
        }
        if let Some(expire) = self.expire {
            form = form.text("expire", expire.to_string());
        }
        form
    }
}
