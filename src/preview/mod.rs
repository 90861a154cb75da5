//! The product preview: a shirt image with the selected color composited in.

mod label;

use std::path::Path;

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::color::HexColor;
use crate::error::FillModeError;

pub use label::{LABEL_ORIGIN, LABEL_SIZE};

pub const SHIRT_WIDTH: u32 = 240;
pub const SHIRT_HEIGHT: u32 = 260;

const OUTLINE: Rgba<u8> = Rgba([40, 40, 40, 255]);
const BODY: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// How the fill color meets the product image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillMode {
    /// Multiply the product by the fill; white areas take the fill exactly.
    #[default]
    Tint,
    /// Paint the fill behind the product, showing through transparent areas.
    Background,
}

impl std::str::FromStr for FillMode {
    type Err = FillModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tint" => Ok(FillMode::Tint),
            "background" => Ok(FillMode::Background),
            other => Err(FillModeError(other.to_string())),
        }
    }
}

/// The rendered preview. `frame()` always reflects the last `set_fill`.
///
/// Like the page it replaces, the frame carries a `color: #xxxxxx` caption in
/// the top-left corner unless turned off with [`PreviewSurface::with_label`].
#[derive(Debug, Clone)]
pub struct PreviewSurface {
    product: RgbaImage,
    mode: FillMode,
    fill: HexColor,
    label: bool,
    frame: RgbaImage,
}

impl PreviewSurface {
    pub fn new(product: RgbaImage, mode: FillMode, fill: HexColor) -> Self {
        let frame = render(&product, mode, &fill, true);
        Self {
            product,
            mode,
            fill,
            label: true,
            frame,
        }
    }

    pub fn with_label(mut self, label: bool) -> Self {
        if self.label != label {
            self.label = label;
            self.frame = render(&self.product, self.mode, &self.fill, label);
        }
        self
    }

    /// Built-in shirt silhouette, used when no product image is configured.
    pub fn shirt(mode: FillMode, fill: HexColor) -> Self {
        Self::new(shirt_silhouette(SHIRT_WIDTH, SHIRT_HEIGHT), mode, fill)
    }

    pub fn from_file(
        path: &Path,
        mode: FillMode,
        fill: HexColor,
    ) -> Result<Self, image::ImageError> {
        let product = image::open(path)?.to_rgba8();
        tracing::debug!(
            "loaded product image {} ({}x{})",
            path.display(),
            product.width(),
            product.height()
        );
        Ok(Self::new(product, mode, fill))
    }

    pub fn set_fill(&mut self, fill: &HexColor) {
        if self.fill == *fill {
            return;
        }
        self.fill = fill.clone();
        self.frame = render(&self.product, self.mode, &self.fill, self.label);
    }

    pub fn fill(&self) -> &HexColor {
        &self.fill
    }

    pub fn has_label(&self) -> bool {
        self.label
    }

    pub fn mode(&self) -> FillMode {
        self.mode
    }

    pub fn frame(&self) -> &RgbaImage {
        &self.frame
    }

    pub fn width(&self) -> u32 {
        self.frame.width()
    }

    pub fn height(&self) -> u32 {
        self.frame.height()
    }
}

fn render(product: &RgbaImage, mode: FillMode, fill: &HexColor, label: bool) -> RgbaImage {
    let (fr, fg, fb) = fill.to_rgb();
    let mut out = RgbaImage::new(product.width(), product.height());
    for (x, y, px) in product.enumerate_pixels() {
        let [r, g, b, a] = px.0;
        let composed = match mode {
            FillMode::Tint => Rgba([mul(r, fr), mul(g, fg), mul(b, fb), a]),
            FillMode::Background => Rgba([
                over(r, fr, a),
                over(g, fg, a),
                over(b, fb, a),
                255,
            ]),
        };
        out.put_pixel(x, y, composed);
    }
    if label {
        label::draw(&mut out, &format!("color: {fill}"));
    }
    out
}

fn mul(c: u8, f: u8) -> u8 {
    ((c as u32 * f as u32 + 127) / 255) as u8
}

fn over(src: u8, dst: u8, alpha: u8) -> u8 {
    let a = alpha as u32;
    ((src as u32 * a + dst as u32 * (255 - a) + 127) / 255) as u8
}

/// A flat T-shirt: body, two sleeves and a neck cut-out, outlined.
fn shirt_silhouette(width: u32, height: u32) -> RgbaImage {
    let inside = |x: i64, y: i64| -> bool {
        let (w, h) = (width as i64, height as i64);
        let body = x >= w / 4 && x < w - w / 4 && y >= h / 10 && y < h - h / 20;
        let sleeves = y >= h / 10 && y < h / 3 && x >= w / 20 && x < w - w / 20;
        let dx = x - w / 2;
        let dy = y - h / 10;
        let neck_r = w / 9;
        let neck = dx * dx + dy * dy < neck_r * neck_r;
        (body || sleeves) && !neck
    };

    RgbaImage::from_fn(width, height, |x, y| {
        let (x, y) = (x as i64, y as i64);
        if !inside(x, y) {
            return Rgba([0, 0, 0, 0]);
        }
        let edge = [(-2, 0), (2, 0), (0, -2), (0, 2)]
            .iter()
            .any(|(dx, dy)| !inside(x + dx, y + dy));
        if edge {
            OUTLINE
        } else {
            BODY
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(s: &str) -> HexColor {
        HexColor::parse(s).unwrap()
    }

    #[test]
    fn tint_takes_fill_on_white() {
        let surface = PreviewSurface::shirt(FillMode::Tint, hex("#800220"));
        let center = surface.frame().get_pixel(SHIRT_WIDTH / 2, SHIRT_HEIGHT / 2);
        assert_eq!(center.0, [0x80, 0x02, 0x20, 255]);
        let corner = surface.frame().get_pixel(0, 0);
        assert_eq!(corner.0[3], 0);
    }

    #[test]
    fn background_shows_through_transparency() {
        let mut product = RgbaImage::new(2, 1);
        product.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        product.put_pixel(1, 0, Rgba([255, 255, 255, 255]));
        let surface = PreviewSurface::new(product, FillMode::Background, hex("#247082"));
        assert_eq!(surface.frame().get_pixel(0, 0).0, [0x24, 0x70, 0x82, 255]);
        assert_eq!(surface.frame().get_pixel(1, 0).0, [255, 255, 255, 255]);
    }

    #[test]
    fn set_fill_rerenders() {
        let mut surface = PreviewSurface::shirt(FillMode::Tint, hex("#334155"));
        surface.set_fill(&hex("#fff"));
        assert_eq!(surface.fill().as_str(), "#fff");
        let center = surface.frame().get_pixel(SHIRT_WIDTH / 2, SHIRT_HEIGHT / 2);
        assert_eq!(center.0, [255, 255, 255, 255]);
    }

    #[test]
    fn shirt_has_outline_and_neck() {
        let shirt = shirt_silhouette(SHIRT_WIDTH, SHIRT_HEIGHT);
        // neck cut-out sits just under the top edge of the body
        assert_eq!(shirt.get_pixel(SHIRT_WIDTH / 2, SHIRT_HEIGHT / 10 + 1).0[3], 0);
        let outlined = shirt.pixels().filter(|p| **p == OUTLINE).count();
        assert!(outlined > 0);
    }

    fn inked_in_caption(frame: &RgbaImage) -> usize {
        let (x0, y0) = LABEL_ORIGIN;
        let (x1, y1) = (x0 + 8 * LABEL_SIZE as u32, y0 + LABEL_SIZE as u32 + 4);
        (y0..y1)
            .flat_map(|y| (x0..x1).map(move |x| (x, y)))
            .filter(|&(x, y)| {
                let p = frame.get_pixel(x, y).0;
                p[3] > 128 && p[0] < 64 && p[1] < 64 && p[2] < 64
            })
            .count()
    }

    #[test]
    fn caption_is_drawn_above_the_shirt() {
        let surface = PreviewSurface::shirt(FillMode::Tint, hex("#A2CFFE"));
        assert!(surface.has_label());
        assert!(inked_in_caption(surface.frame()) > 20);

        let plain = surface.clone().with_label(false);
        assert_eq!(inked_in_caption(plain.frame()), 0);
        // the caption stays clear of the shirt body
        let (cx, cy) = (SHIRT_WIDTH / 2, SHIRT_HEIGHT / 2);
        assert_eq!(surface.frame().get_pixel(cx, cy), plain.frame().get_pixel(cx, cy));
    }

    #[test]
    fn caption_follows_fill() {
        let mut surface = PreviewSurface::shirt(FillMode::Background, hex("#334155"));
        let before = surface.frame().clone();
        surface.set_fill(&hex("#334156"));
        let caption_changed = before
            .enumerate_pixels()
            .filter(|(_, y, _)| *y < LABEL_ORIGIN.1 + LABEL_SIZE as u32 + 4)
            .any(|(x, y, p)| {
                let now = surface.frame().get_pixel(x, y);
                // ignore the one-step background change
                (p.0[0] as i32 - now.0[0] as i32).abs() > 8
            });
        assert!(caption_changed);
    }

    #[test]
    fn parses_fill_mode() {
        assert_eq!("Tint".parse::<FillMode>(), Ok(FillMode::Tint));
        assert_eq!("background".parse::<FillMode>(), Ok(FillMode::Background));
        assert_eq!(
            "stripes".parse::<FillMode>(),
            Err(FillModeError("stripes".into()))
        );
    }
}
