//! Preview export: capture the preview as PNG, then offer download and copy.
//!
//! [`ExportPipeline`] walks `idle -> capturing -> ready | failed -> idle`.
//! Every method takes `&self`; the state sits in a `RefCell` so several
//! futures on one thread can share the pipeline. No borrow is held across an
//! await, and continuations check a generation counter so a result that
//! arrives after the dialog was dismissed (or replaced) is dropped.

mod capture;
mod host;
mod system;

use std::cell::{Cell, RefCell};
use std::path::PathBuf;

pub use capture::{CapturedImage, Rasterizer, SoftwareRasterizer, PNG_MIME};
pub use host::{
    ClipboardAccess, ClipboardItem, DownloadSink, Notification, NotificationLevel, Notifier,
    Permission, DOWNLOAD_FILENAME,
};
pub use system::{FileDownloads, LogNotifier, SystemClipboard};

use crate::error::ExportError;
use crate::preview::PreviewSurface;

pub const COPY_SUCCESS: &str = "Image copied to clipboard! Paste to share.";
pub const COPY_FAILURE: &str = "Failed to copy image, please try again.";
pub const CAPTURE_FAILURE: &str = "Failed to capture image, please try again.";
pub const LONG_PRESS_HINT: &str = "Long-press the image to copy it.";

/// Whether the copy action is offered for the current capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyAvailability {
    Unprobed,
    Granted,
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyExport {
    pub image: CapturedImage,
    pub copy: CopyAvailability,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportIntent {
    Idle,
    Capturing,
    Ready(ReadyExport),
    Failed(String),
}

/// What a call to [`ExportPipeline::request_capture`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    Ready,
    Failed,
    /// A capture was already running.
    Ignored,
    /// No surface to capture.
    Refused,
}

pub struct ExportPipeline<R, C, D, N> {
    rasterizer: R,
    clipboard: C,
    downloads: D,
    notifier: N,
    intent: RefCell<ExportIntent>,
    generation: Cell<u64>,
}

impl<R, C, D, N> ExportPipeline<R, C, D, N>
where
    R: Rasterizer,
    C: ClipboardAccess,
    D: DownloadSink,
    N: Notifier,
{
    pub fn new(rasterizer: R, clipboard: C, downloads: D, notifier: N) -> Self {
        Self {
            rasterizer,
            clipboard,
            downloads,
            notifier,
            intent: RefCell::new(ExportIntent::Idle),
            generation: Cell::new(0),
        }
    }

    pub fn intent(&self) -> ExportIntent {
        self.intent.borrow().clone()
    }

    pub fn is_capturing(&self) -> bool {
        matches!(*self.intent.borrow(), ExportIntent::Capturing)
    }

    /// The current capture, if one is ready.
    pub fn captured(&self) -> Option<CapturedImage> {
        match &*self.intent.borrow() {
            ExportIntent::Ready(ready) => Some(ready.image.clone()),
            _ => None,
        }
    }

    pub fn copy_available(&self) -> bool {
        matches!(
            &*self.intent.borrow(),
            ExportIntent::Ready(ReadyExport {
                copy: CopyAvailability::Granted,
                ..
            })
        )
    }

    /// Instruction shown in place of the copy button when copying is unsupported.
    pub fn copy_hint(&self) -> Option<&'static str> {
        match &*self.intent.borrow() {
            ExportIntent::Ready(ReadyExport {
                copy: CopyAvailability::Unsupported,
                ..
            }) => Some(LONG_PRESS_HINT),
            _ => None,
        }
    }

    /// Rasterize `surface` into a PNG. The surface must already show the
    /// latest color. Ignored while another capture runs.
    pub async fn request_capture(&self, surface: Option<&PreviewSurface>) -> CaptureOutcome {
        if self.is_capturing() {
            tracing::debug!("capture already in progress, ignoring request");
            return CaptureOutcome::Ignored;
        }
        let Some(surface) = surface else {
            tracing::warn!("capture requested before the preview was mounted");
            return CaptureOutcome::Refused;
        };

        let generation = self.bump_generation();
        *self.intent.borrow_mut() = ExportIntent::Capturing;
        tracing::debug!(
            "capturing {}x{} preview filled with {}",
            surface.width(),
            surface.height(),
            surface.fill()
        );

        let result = match self.rasterizer.rasterize(surface).await {
            Ok(pixels) => CapturedImage::encode(&pixels),
            Err(err) => Err(err),
        };

        // capturing blocks dismiss and new captures, so this is still ours
        debug_assert_eq!(generation, self.generation.get());
        match result {
            Ok(image) => {
                tracing::info!(
                    "captured {}x{} preview ({} bytes)",
                    image.width(),
                    image.height(),
                    image.png_bytes().len()
                );
                *self.intent.borrow_mut() = ExportIntent::Ready(ReadyExport {
                    image,
                    copy: CopyAvailability::Unprobed,
                });
                CaptureOutcome::Ready
            }
            Err(err) => {
                tracing::error!("capture failed: {}", err);
                *self.intent.borrow_mut() = ExportIntent::Failed(err.to_string());
                self.notifier.notify(Notification::error(CAPTURE_FAILURE));
                CaptureOutcome::Failed
            }
        }
    }

    /// Ask whether the clipboard accepts images and record the answer on the
    /// ready capture. A probe error counts as unsupported.
    pub async fn probe_clipboard(&self) -> CopyAvailability {
        if !matches!(*self.intent.borrow(), ExportIntent::Ready(_)) {
            return CopyAvailability::Unprobed;
        }
        let generation = self.generation.get();

        let availability = match self.clipboard.query_permission().await {
            Ok(Permission::Granted) => CopyAvailability::Granted,
            Ok(other) => {
                tracing::debug!("clipboard permission is {:?}", other);
                CopyAvailability::Unsupported
            }
            Err(err) => {
                tracing::warn!("clipboard permission probe failed: {}", err);
                CopyAvailability::Unsupported
            }
        };

        if generation != self.generation.get() {
            tracing::debug!("discarding stale clipboard probe");
            return CopyAvailability::Unprobed;
        }
        if let ExportIntent::Ready(ready) = &mut *self.intent.borrow_mut() {
            ready.copy = availability;
        }
        availability
    }

    /// Save the ready capture as `image.png`.
    pub fn download(&self) -> Result<PathBuf, ExportError> {
        let image = self.captured().ok_or(ExportError::NothingCaptured)?;
        match self.downloads.save(DOWNLOAD_FILENAME, image.png_bytes()) {
            Ok(path) => {
                tracing::info!("saved capture to {}", path.display());
                self.notifier
                    .notify(Notification::success(format!("Saved {}", path.display())));
                Ok(path)
            }
            Err(err) => {
                tracing::error!("download failed: {}", err);
                self.notifier
                    .notify(Notification::error("Failed to save image, please try again."));
                Err(err.into())
            }
        }
    }

    /// Write the ready capture to the clipboard as `image/png`. Only offered
    /// once `probe_clipboard` granted it. The capture is kept on failure.
    /// If the dialog is closed while the write is pending, the outcome is not
    /// reported and `ExportError::Dismissed` is returned.
    pub async fn copy_to_clipboard(&self) -> Result<(), ExportError> {
        let image = match &*self.intent.borrow() {
            ExportIntent::Ready(ReadyExport {
                image,
                copy: CopyAvailability::Granted,
            }) => image.clone(),
            ExportIntent::Ready(_) => return Err(ExportError::CopyUnavailable),
            _ => return Err(ExportError::NothingCaptured),
        };
        let generation = self.generation.get();

        let item = ClipboardItem {
            mime: PNG_MIME,
            image: &image,
        };
        let result = self.clipboard.write(item).await;

        if generation != self.generation.get() {
            tracing::debug!(
                "clipboard write finished after the dialog closed (ok: {})",
                result.is_ok()
            );
            return Err(ExportError::Dismissed);
        }
        match result {
            Ok(()) => {
                tracing::info!("copied capture to clipboard");
                self.notifier.notify(Notification::success(COPY_SUCCESS));
                Ok(())
            }
            Err(err) => {
                tracing::error!("clipboard write failed: {}", err);
                self.notifier.notify(Notification::error(COPY_FAILURE));
                Err(err.into())
            }
        }
    }

    /// Close the result dialog. Has no effect while capturing.
    pub fn dismiss(&self) {
        let mut intent = self.intent.borrow_mut();
        if matches!(*intent, ExportIntent::Capturing) {
            tracing::debug!("capture in progress, dismiss ignored");
            return;
        }
        if matches!(*intent, ExportIntent::Idle) {
            return;
        }
        *intent = ExportIntent::Idle;
        self.bump_generation();
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    fn bump_generation(&self) -> u64 {
        let next = self.generation.get() + 1;
        self.generation.set(next);
        next
    }
}
