use thiserror::Error;

/// Why a piece of text is not a usable hex color.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HexError {
    #[error("empty color string")]
    Empty,

    #[error("hex color must have 3 or 6 digits, got {0}")]
    InvalidLength(usize),

    #[error("invalid hex digit {0:?}")]
    InvalidDigit(char),
}

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("preview surface has no pixels ({width}x{height})")]
    EmptySurface { width: u32, height: u32 },

    #[error("rendering not supported: {0}")]
    Unsupported(String),

    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

#[derive(Error, Debug)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),

    #[error("clipboard write rejected: {0}")]
    Rejected(String),

    #[error("captured image could not be decoded: {0}")]
    Decode(#[from] image::ImageError),
}

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("no captured image is ready")]
    NothingCaptured,

    #[error("copying to the clipboard is not available here")]
    CopyUnavailable,

    #[error("the export dialog was closed before the operation finished")]
    Dismissed,

    #[error("clipboard error: {0}")]
    Clipboard(#[from] ClipboardError),

    #[error("download error: {0}")]
    Download(#[from] DownloadError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A command-line color input event that could not be understood.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("expected <kind>:<value>, got {0:?}")]
    MissingKind(String),

    #[error("unknown input kind {0:?}")]
    UnknownKind(String),

    #[error("bad number {0:?}")]
    BadNumber(String),

    #[error("{0:?} is not a finite number")]
    NotFinite(String),

    #[error("hsv needs 3 or 4 components, got {0}")]
    Components(usize),

    #[error(transparent)]
    Hex(#[from] HexError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown fill mode {0:?} (expected tint or background)")]
pub struct FillModeError(pub String);
