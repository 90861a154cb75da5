//! Current color selection.
//!
//! [`ColorState`] keeps the hex text the user is editing, the last
//! well-formed color, and the HSV tuple the wheel and slider work in.
//! Whichever side a change comes from is stored as given; the other side is
//! recomputed from it. Subscribers run synchronously after every publish,
//! once the new state is fully stored.

use std::str::FromStr;

use crate::color::{HexColor, Hsva};
use crate::error::InputError;

pub const INITIAL_COLOR: &str = "#334155";

pub const SOLIDS: [&str; 9] = [
    "#2c5346", "#800220", "#9f88a2", "#7856a0", "#493362", "#A2CFFE", "#92bce2", "#247082",
    "#101213",
];

/// The built-in swatch grid.
pub fn default_swatches() -> Vec<HexColor> {
    SOLIDS
        .iter()
        .filter_map(|s| HexColor::parse(s).ok())
        .collect()
}

/// Index of the swatch showing the same color as `current`, if any.
pub fn highlighted_swatch(swatches: &[HexColor], current: &HexColor) -> Option<usize> {
    swatches.iter().position(|s| s.same_color(current))
}

/// One input event from any of the color widgets.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorInput {
    /// Free text typed into the hex field; may be incomplete.
    HexEdited(String),
    /// Wheel or shade slider moved.
    HsvDragged(Hsva),
    /// A swatch from the grid was clicked.
    SwatchPicked(HexColor),
    /// A shade-strip entry was clicked: current value scaled by the factor.
    ShadeScaled(f32),
}

/// Textual form used on the command line:
/// `hex:<text>`, `hsv:<h>,<s>,<v>[,<a>]`, `swatch:<hex>`, `shade:<factor>`.
impl FromStr for ColorInput {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, value) = s
            .split_once(':')
            .ok_or_else(|| InputError::MissingKind(s.to_string()))?;
        match kind.trim() {
            "hex" => Ok(ColorInput::HexEdited(value.to_string())),
            "swatch" => Ok(ColorInput::SwatchPicked(HexColor::parse(value)?)),
            "shade" => Ok(ColorInput::ShadeScaled(parse_number(value)?)),
            "hsv" => {
                let parts = value
                    .split(',')
                    .map(|p| parse_number(p.trim().trim_end_matches('%')))
                    .collect::<Result<Vec<_>, _>>()?;
                let hsva = match parts.as_slice() {
                    [h, s, v] => Hsva::new(*h, *s, *v, 1.0),
                    [h, s, v, a] => Hsva::new(*h, *s, *v, *a),
                    _ => return Err(InputError::Components(parts.len())),
                };
                Ok(ColorInput::HsvDragged(clamp_hsva(hsva)))
            }
            other => Err(InputError::UnknownKind(other.to_string())),
        }
    }
}

/// `f32::from_str` admits `NaN` and `inf`; neither is a usable channel value.
fn parse_number(text: &str) -> Result<f32, InputError> {
    let n = text
        .trim()
        .parse::<f32>()
        .map_err(|_| InputError::BadNumber(text.to_string()))?;
    if !n.is_finite() {
        return Err(InputError::NotFinite(text.to_string()));
    }
    Ok(n)
}

/// Widgets hand over values already in range; free-form sources go through this.
fn clamp_hsva(hsva: Hsva) -> Hsva {
    Hsva {
        h: hsva.h.rem_euclid(360.0),
        s: hsva.s.clamp(0.0, 100.0),
        v: hsva.v.clamp(0.0, 100.0),
        a: hsva.a.clamp(0.0, 1.0),
    }
}

/// What subscribers receive after a publish.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedColor {
    pub hex: HexColor,
    pub hsva: Hsva,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&PublishedColor)>;

pub struct ColorState {
    text: String,
    current: PublishedColor,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_id: u64,
}

impl ColorState {
    pub fn new(initial: HexColor) -> Self {
        let hsva = Hsva::from_hex(&initial);
        Self {
            text: initial.to_string(),
            current: PublishedColor { hex: initial, hsva },
            subscribers: Vec::new(),
            next_id: 0,
        }
    }

    /// The hex field's contents, including text that is not a color yet.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Last well-formed color.
    pub fn canonical(&self) -> &HexColor {
        &self.current.hex
    }

    pub fn hsva(&self) -> Hsva {
        self.current.hsva
    }

    pub fn current(&self) -> &PublishedColor {
        &self.current
    }

    /// Store `input` as the field text; publish it only when it is well-formed.
    /// Returns whether a publish happened.
    pub fn set_color_from_hex(&mut self, input: &str) -> bool {
        self.text = input.to_string();
        match HexColor::parse(input) {
            Ok(hex) => {
                let hsva = Hsva::from_hex(&hex);
                self.publish(hex, hsva);
                true
            }
            Err(err) => {
                tracing::debug!("hex input {:?} withheld: {}", input, err);
                false
            }
        }
    }

    /// Store the tuple verbatim and derive the hex from it.
    pub fn set_color_from_hsv(&mut self, hsva: Hsva) {
        let hex = hsva.to_hex();
        self.text = hex.to_string();
        self.publish(hex, hsva);
    }

    pub fn select_solid(&mut self, hex: &HexColor) {
        let hsva = Hsva::from_hex(hex);
        self.text = hex.to_string();
        self.publish(hex.clone(), hsva);
    }

    /// Route a widget event to the matching operation. Returns whether a publish happened.
    pub fn apply(&mut self, input: ColorInput) -> bool {
        match input {
            ColorInput::HexEdited(text) => self.set_color_from_hex(&text),
            ColorInput::HsvDragged(hsva) => {
                self.set_color_from_hsv(hsva);
                true
            }
            ColorInput::SwatchPicked(hex) => {
                self.select_solid(&hex);
                true
            }
            ColorInput::ShadeScaled(factor) => {
                self.set_color_from_hsv(self.current.hsva.scaled_value(factor));
                true
            }
        }
    }

    /// Register a callback; it is not called for the current value, only for later publishes.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&PublishedColor) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    fn publish(&mut self, hex: HexColor, hsva: Hsva) {
        self.current = PublishedColor { hex, hsva };
        tracing::trace!("color published: {}", self.current.hex);
        for (_, callback) in self.subscribers.iter_mut() {
            callback(&self.current);
        }
    }
}

impl Default for ColorState {
    fn default() -> Self {
        let initial =
            HexColor::parse(INITIAL_COLOR).unwrap_or_else(|_| HexColor::from_rgb(0x33, 0x41, 0x55));
        Self::new(initial)
    }
}
