//! tee-tint: pick a shirt color, preview it, export the preview as PNG.
//!
//! [`state::ColorState`] owns the selected color and publishes every change
//! to its subscribers (typically a [`preview::PreviewSurface`]).
//! [`export::ExportPipeline`] captures the surface and hands the image to a
//! download sink or the clipboard.

pub mod color;
pub mod config;
pub mod error;
pub mod export;
pub mod preview;
pub mod state;

pub use color::{HexColor, Hsva};
pub use state::{ColorInput, ColorState};
