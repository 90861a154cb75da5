//! Desktop implementations of the pipeline's collaborators.

use std::borrow::Cow;
use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use arboard::{Clipboard, ImageData};
use futures::channel::oneshot;

use crate::error::{ClipboardError, DownloadError};

use super::host::{
    ClipboardAccess, ClipboardItem, DownloadSink, Notification, NotificationLevel, Notifier,
    Permission,
};
use super::capture::PNG_MIME;

/// How long a Linux write keeps serving the clipboard if nobody pastes.
pub const DEFAULT_CLIPBOARD_WAIT: Duration = Duration::from_secs(30);

/// The system clipboard through `arboard`.
///
/// Writes run on their own thread. On Linux the clipboard is owned by the
/// writing process, so that thread keeps serving the image until another
/// application takes it or `wait` runs out; the write resolves then.
#[derive(Debug, Clone, Copy)]
pub struct SystemClipboard {
    wait: Duration,
}

impl SystemClipboard {
    pub fn new(wait: Duration) -> Self {
        Self { wait }
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new(DEFAULT_CLIPBOARD_WAIT)
    }
}

impl ClipboardAccess for SystemClipboard {
    async fn query_permission(&self) -> Result<Permission, ClipboardError> {
        match Clipboard::new() {
            Ok(_) => Ok(Permission::Granted),
            Err(arboard::Error::ClipboardNotSupported) => Ok(Permission::Denied),
            Err(e) => Err(ClipboardError::Unavailable(e.to_string())),
        }
    }

    async fn write(&self, item: ClipboardItem<'_>) -> Result<(), ClipboardError> {
        if item.mime != PNG_MIME {
            return Err(ClipboardError::Rejected(format!(
                "unsupported clipboard type {}",
                item.mime
            )));
        }
        let pixels = item.image.decode_rgba()?;
        let data = ImageData {
            width: pixels.width() as usize,
            height: pixels.height() as usize,
            bytes: Cow::Owned(pixels.into_raw()),
        };
        let deadline = Instant::now() + self.wait;
        on_thread(move || {
            let mut clipboard = Clipboard::new().map_err(|e| e.to_string())?;
            set_image(&mut clipboard, data, deadline).map_err(|e| e.to_string())
        })
        .await
    }
}

/// Run blocking clipboard work on a dedicated thread and resolve with its result.
async fn on_thread<F>(work: F) -> Result<(), ClipboardError>
where
    F: FnOnce() -> Result<(), String> + Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    thread::Builder::new()
        .name("clipboard".into())
        .spawn(move || {
            let _ = tx.send(work());
        })
        .map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
    match rx.await {
        Ok(result) => result.map_err(ClipboardError::Rejected),
        Err(_) => Err(ClipboardError::Rejected("clipboard thread exited".into())),
    }
}

#[cfg(target_os = "linux")]
fn set_image(
    clipboard: &mut Clipboard,
    data: ImageData<'static>,
    deadline: Instant,
) -> Result<(), arboard::Error> {
    use arboard::SetExtLinux;
    clipboard.set().wait_until(deadline).image(data)
}

#[cfg(not(target_os = "linux"))]
fn set_image(
    clipboard: &mut Clipboard,
    data: ImageData<'static>,
    _deadline: Instant,
) -> Result<(), arboard::Error> {
    clipboard.set_image(data)
}

/// Saves downloads into a directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct FileDownloads {
    dir: PathBuf,
}

impl FileDownloads {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }
}

impl DownloadSink for FileDownloads {
    fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, DownloadError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(filename);
        fs::write(&path, bytes)?;
        Ok(path)
    }
}

/// Reports notifications through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Info => tracing::info!("{}", notification.message),
            NotificationLevel::Success => tracing::info!("✓ {}", notification.message),
            NotificationLevel::Error => tracing::error!("{}", notification.message),
        }
    }
}
