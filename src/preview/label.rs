//! The `color: #xxxxxx` caption, rasterized with fontdue from an embedded font.

use std::sync::OnceLock;

use fontdue::{Font, FontSettings};
use image::{Rgba, RgbaImage};

const EMBEDDED_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

/// Pixel size of the caption text.
pub const LABEL_SIZE: f32 = 14.0;
/// Top-left corner of the caption box.
pub const LABEL_ORIGIN: (u32, u32) = (16, 8);

const INK: [u8; 3] = [0, 0, 0];

fn font() -> Option<&'static Font> {
    static FONT: OnceLock<Option<Font>> = OnceLock::new();
    FONT.get_or_init(|| match Font::from_bytes(EMBEDDED_FONT, FontSettings::default()) {
        Ok(font) => Some(font),
        Err(err) => {
            tracing::warn!("caption font unusable, preview drawn without label: {}", err);
            None
        }
    })
    .as_ref()
}

/// Draw `text` in black at [`LABEL_ORIGIN`], clipped to the frame.
pub(super) fn draw(frame: &mut RgbaImage, text: &str) {
    let Some(font) = font() else {
        return;
    };
    let ascent = font
        .horizontal_line_metrics(LABEL_SIZE)
        .map_or(LABEL_SIZE, |m| m.ascent);
    let baseline = (LABEL_ORIGIN.1 as f32 + ascent).round() as i64;
    let (width, height) = (frame.width() as i64, frame.height() as i64);

    let mut pen_x = LABEL_ORIGIN.0 as f32;
    for c in text.chars() {
        let (metrics, coverage) = font.rasterize(c, LABEL_SIZE);
        let left = pen_x.round() as i64 + metrics.xmin as i64;
        let top = baseline - metrics.height as i64 - metrics.ymin as i64;
        for row in 0..metrics.height {
            for col in 0..metrics.width {
                let cover = coverage[row * metrics.width + col];
                let (x, y) = (left + col as i64, top + row as i64);
                if cover == 0 || x < 0 || y < 0 || x >= width || y >= height {
                    continue;
                }
                blend(frame.get_pixel_mut(x as u32, y as u32), cover);
            }
        }
        pen_x += metrics.advance_width;
    }
}

fn blend(px: &mut Rgba<u8>, cover: u8) {
    let a = cover as u32;
    for (c, ink) in px.0.iter_mut().zip(INK) {
        *c = ((ink as u32 * a + *c as u32 * (255 - a) + 127) / 255) as u8;
    }
    px.0[3] = px.0[3].max(cover);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_font_loads() {
        assert!(font().is_some());
    }

    #[test]
    fn clipped_to_small_frames() {
        let mut tiny = RgbaImage::new(20, 10);
        draw(&mut tiny, "color: #fff");
        let mut empty = RgbaImage::new(0, 0);
        draw(&mut empty, "color: #fff");
        assert_eq!(empty.width(), 0);
    }

    #[test]
    fn full_cover_paints_ink() {
        let mut px = Rgba([200, 100, 50, 0]);
        blend(&mut px, 255);
        assert_eq!(px.0, [0, 0, 0, 255]);
        let mut half = Rgba([255, 255, 255, 255]);
        blend(&mut half, 128);
        assert_eq!(half.0, [127, 127, 127, 255]);
    }
}
