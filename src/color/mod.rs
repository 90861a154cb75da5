//! Color representations: the canonical hex string and the HSV tuple used by
//! the wheel and shade slider.

mod hex;
mod hsva;

pub use hex::HexColor;
pub use hsva::{Hsva, SHADE_FACTORS};
