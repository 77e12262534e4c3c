//! Transient user notifications

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default lifetime of a notification
pub const DEFAULT_NOTIFICATION_DURATION: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    /// Glyph shown next to the message
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Success => "✔",
            Self::Error => "✖",
            Self::Warning => "⚠",
            Self::Info => "ℹ",
        }
    }
}

/// A short-lived message; removes itself after `duration`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub message: String,
    pub severity: Severity,
    #[serde(rename = "duration_ms", with = "duration_ms")]
    pub duration: Duration,
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}
