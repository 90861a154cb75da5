//! What the export pipeline needs from its surroundings.

use std::path::PathBuf;

use crate::error::{ClipboardError, DownloadError};

use super::capture::CapturedImage;

/// Fixed name the capture is saved under.
pub const DOWNLOAD_FILENAME: &str = "image.png";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
    Prompt,
}

/// One clipboard entry.
#[derive(Debug, Clone, Copy)]
pub struct ClipboardItem<'a> {
    pub mime: &'a str,
    pub image: &'a CapturedImage,
}

#[allow(async_fn_in_trait)]
pub trait ClipboardAccess {
    async fn query_permission(&self) -> Result<Permission, ClipboardError>;
    async fn write(&self, item: ClipboardItem<'_>) -> Result<(), ClipboardError>;
}

pub trait DownloadSink {
    /// Save `bytes` under `filename`, returning where they ended up.
    fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, DownloadError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// A transient user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

pub trait Notifier {
    fn notify(&self, notification: Notification);
}
