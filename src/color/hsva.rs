use palette::{FromColor, Hsv, IntoColor, Srgb};
use serde::{Deserialize, Serialize};

use super::HexColor;

/// Factors applied to the value channel for the shade strip:
/// lighter 2, lighter 1, darker 1, darker 2.
pub const SHADE_FACTORS: [f32; 4] = [1.5, 1.2, 0.7, 0.5];

/// HSV with alpha, in the ranges the wheel and shade slider work in:
/// `h` in [0, 360), `s` and `v` in [0, 100], `a` in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsva {
    pub h: f32,
    pub s: f32,
    pub v: f32,
    pub a: f32,
}

impl Hsva {
    pub fn new(h: f32, s: f32, v: f32, a: f32) -> Self {
        Self { h, s, v, a }
    }

    pub fn from_hex(hex: &HexColor) -> Self {
        let (r, g, b) = hex.to_rgb();
        let srgb = Srgb::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
        let hsv: Hsv = Hsv::from_color(srgb);
        let mut h = hsv.hue.into_positive_degrees();
        if h >= 360.0 {
            h = 0.0;
        }
        Self {
            h,
            s: hsv.saturation * 100.0,
            v: hsv.value * 100.0,
            a: 1.0,
        }
    }

    /// Six-digit lowercase hex. Alpha is not encoded.
    pub fn to_hex(&self) -> HexColor {
        let hsv: Hsv = Hsv::new(
            self.h.rem_euclid(360.0),
            (self.s / 100.0).clamp(0.0, 1.0),
            (self.v / 100.0).clamp(0.0, 1.0),
        );
        let rgb: Srgb = hsv.into_color();
        HexColor::from_rgb(channel(rgb.red), channel(rgb.green), channel(rgb.blue))
    }

    /// Same hue and saturation with the value channel scaled, clamped to 100.
    /// A non-finite factor leaves the color unchanged.
    pub fn scaled_value(&self, factor: f32) -> Self {
        if !factor.is_finite() {
            return *self;
        }
        Self {
            v: (self.v * factor).clamp(0.0, 100.0),
            ..*self
        }
    }

    /// The shade strip next to the slider, lightest first.
    pub fn shades(&self) -> [Hsva; 4] {
        SHADE_FACTORS.map(|factor| self.scaled_value(factor))
    }
}

fn channel(c: f32) -> u8 {
    (c * 255.0).round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(s: &str) -> HexColor {
        HexColor::parse(s).unwrap()
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 0.01
    }

    #[test]
    fn primary_colors() {
        let red = Hsva::from_hex(&hex("#ff0000"));
        assert!(close(red.h, 0.0) && close(red.s, 100.0) && close(red.v, 100.0));
        assert_eq!(red.a, 1.0);

        let blue = Hsva::from_hex(&hex("#00f"));
        assert!(close(blue.h, 240.0) && close(blue.s, 100.0) && close(blue.v, 100.0));
    }

    #[test]
    fn grey_has_no_saturation() {
        let grey = Hsva::from_hex(&hex("#808080"));
        assert!(close(grey.s, 0.0));
        assert_eq!(grey.to_hex().as_str(), "#808080");
    }

    #[test]
    fn hsv_to_hex() {
        assert_eq!(Hsva::new(120.0, 100.0, 100.0, 1.0).to_hex().as_str(), "#00ff00");
        assert_eq!(Hsva::new(0.0, 0.0, 0.0, 0.3).to_hex().as_str(), "#000000");
        assert_eq!(Hsva::new(360.0, 100.0, 100.0, 1.0).to_hex().as_str(), "#ff0000");
    }

    #[test]
    fn hex_round_trips_through_hsv() {
        for s in ["#334155", "#800220", "#A2CFFE", "#101213", "#fa0", "#123456"] {
            let original = hex(s);
            let back = Hsva::from_hex(&original).to_hex();
            assert!(original.same_color(&back), "{s} came back as {back}");
        }
    }

    #[test]
    fn every_short_hex_round_trips() {
        for n in 0..0x1000u32 {
            let original = hex(&format!("#{:03x}", n));
            let back = Hsva::from_hex(&original).to_hex();
            assert!(original.same_color(&back), "{original} came back as {back}");
        }
    }

    #[test]
    fn long_hex_round_trips_across_the_cube() {
        // odd stride so every channel sees low, mid and high bytes
        for n in (0..=0xff_ffffu32).step_by(4099) {
            let original = hex(&format!("#{:06x}", n));
            let back = Hsva::from_hex(&original).to_hex();
            assert!(original.same_color(&back), "{original} came back as {back}");
        }
        for v in 0..=255u8 {
            for original in [
                HexColor::from_rgb(v, v, v),
                HexColor::from_rgb(v, 0, 255 - v),
                HexColor::from_rgb(255, v, v / 2),
            ] {
                let back = Hsva::from_hex(&original).to_hex();
                assert!(original.same_color(&back), "{original} came back as {back}");
            }
        }
    }

    #[test]
    fn shades_scale_value_only() {
        let base = Hsva::new(200.0, 40.0, 80.0, 1.0);
        let [l2, l1, d1, d2] = base.shades();
        assert_eq!(l2.v, 100.0);
        assert!(close(l1.v, 96.0));
        assert!(close(d1.v, 56.0));
        assert!(close(d2.v, 40.0));
        assert_eq!(d2.h, 200.0);
        assert_eq!(d2.s, 40.0);
        assert_eq!(base.scaled_value(f32::NAN), base);
        assert_eq!(base.scaled_value(f32::INFINITY), base);
    }
}
