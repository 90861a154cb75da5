use std::rc::Rc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, ImageFormat, RgbaImage};

use crate::error::CaptureError;
use crate::preview::PreviewSurface;

pub const PNG_MIME: &str = "image/png";

/// Turns the preview into pixels.
#[allow(async_fn_in_trait)]
pub trait Rasterizer {
    async fn rasterize(&self, surface: &PreviewSurface) -> Result<RgbaImage, CaptureError>;
}

/// Reads the surface's current frame directly.
#[derive(Debug, Default, Clone, Copy)]
pub struct SoftwareRasterizer;

impl Rasterizer for SoftwareRasterizer {
    async fn rasterize(&self, surface: &PreviewSurface) -> Result<RgbaImage, CaptureError> {
        let (width, height) = (surface.width(), surface.height());
        if width == 0 || height == 0 {
            return Err(CaptureError::EmptySurface { width, height });
        }
        Ok(surface.frame().clone())
    }
}

/// PNG snapshot of the preview. Cloning shares the bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedImage {
    width: u32,
    height: u32,
    png: Rc<[u8]>,
}

impl CapturedImage {
    pub fn encode(pixels: &RgbaImage) -> Result<Self, CaptureError> {
        let mut png = Vec::new();
        PngEncoder::new(&mut png).write_image(
            pixels.as_raw(),
            pixels.width(),
            pixels.height(),
            ColorType::Rgba8,
        )?;
        Ok(Self {
            width: pixels.width(),
            height: pixels.height(),
            png: png.into(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn png_bytes(&self) -> &[u8] {
        &self.png
    }

    /// `data:image/png;base64,...` for showing the capture inline.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", PNG_MIME, STANDARD.encode(&self.png))
    }

    pub fn decode_rgba(&self) -> Result<RgbaImage, image::ImageError> {
        Ok(image::load_from_memory_with_format(&self.png, ImageFormat::Png)?.to_rgba8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::HexColor;
    use crate::preview::FillMode;
    use futures::executor::block_on;
    use image::Rgba;

    #[test]
    fn encodes_and_decodes_png() {
        let mut pixels = RgbaImage::new(3, 2);
        pixels.put_pixel(2, 1, Rgba([0x80, 0x02, 0x20, 255]));
        let captured = CapturedImage::encode(&pixels).unwrap();
        assert_eq!((captured.width(), captured.height()), (3, 2));
        assert_eq!(&captured.png_bytes()[1..4], b"PNG");
        assert_eq!(captured.decode_rgba().unwrap(), pixels);
    }

    #[test]
    fn data_url_is_base64_png() {
        let captured = CapturedImage::encode(&RgbaImage::new(1, 1)).unwrap();
        let url = captured.data_url();
        assert!(url.starts_with("data:image/png;base64,iVBORw0KGgo"));
    }

    #[test]
    fn software_rasterizer_copies_frame() {
        let surface = PreviewSurface::shirt(FillMode::Tint, HexColor::parse("#800220").unwrap());
        let pixels = block_on(SoftwareRasterizer.rasterize(&surface)).unwrap();
        assert_eq!(&pixels, surface.frame());
    }

    #[test]
    fn empty_surface_is_refused() {
        let surface = PreviewSurface::new(
            RgbaImage::new(0, 10),
            FillMode::Tint,
            HexColor::parse("#fff").unwrap(),
        );
        let err = block_on(SoftwareRasterizer.rasterize(&surface)).unwrap_err();
        assert!(matches!(err, CaptureError::EmptySurface { width: 0, height: 10 }));
    }
}
