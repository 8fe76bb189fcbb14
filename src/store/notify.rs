use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

pub const DEFAULT_NOTIFICATION_DURATION: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Info,
}

/// A transient user-facing message. Lives in the queue until its duration
/// elapses or it is dismissed manually, whichever comes first.
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: Uuid,
    pub severity: Severity,
    pub message: String,
    pub duration: Duration,
}

impl Notification {
    pub fn new(severity: Severity, message: impl Into<String>, duration: Option<Duration>) -> Self {
        Self {
            id: Uuid::new_v4(),
            severity,
            message: message.into(),
            duration: duration.unwrap_or(DEFAULT_NOTIFICATION_DURATION),
        }
    }
}
