use std::fmt;
use std::str::FromStr;

use crate::error::HexError;

/// A well-formed hex color: `#` followed by exactly 3 or 6 hex digits.
///
/// The digits keep the case they were typed in, so a swatch like `#A2CFFE`
/// reads back unchanged. Use [`HexColor::same_color`] to compare two values
/// regardless of case or short form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HexColor(String);

impl HexColor {
    /// Parse free text. Whitespace around the value and the leading `#` are optional.
    pub fn parse(input: &str) -> Result<Self, HexError> {
        let clean = input.trim();
        let digits = clean.strip_prefix('#').unwrap_or(clean);
        if digits.is_empty() {
            return Err(HexError::Empty);
        }
        if let Some(bad) = digits.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(HexError::InvalidDigit(bad));
        }
        match digits.len() {
            3 | 6 => Ok(Self(format!("#{digits}"))),
            n => Err(HexError::InvalidLength(n)),
        }
    }

    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self(format!("#{:02x}{:02x}{:02x}", r, g, b))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The digits without the leading `#`.
    pub fn digits(&self) -> &str {
        &self.0[1..]
    }

    pub fn to_rgb(&self) -> (u8, u8, u8) {
        let d = self.digits().as_bytes();
        // parse() only admits ASCII hex digits, so every nibble is in range
        let nibble = |c: u8| match c {
            b'0'..=b'9' => c - b'0',
            b'a'..=b'f' => c - b'a' + 10,
            _ => c - b'A' + 10,
        };
        if d.len() == 3 {
            (nibble(d[0]) * 17, nibble(d[1]) * 17, nibble(d[2]) * 17)
        } else {
            (
                nibble(d[0]) << 4 | nibble(d[1]),
                nibble(d[2]) << 4 | nibble(d[3]),
                nibble(d[4]) << 4 | nibble(d[5]),
            )
        }
    }

    /// True when both values describe the same RGB color (`#ABC` == `#aabbcc`).
    pub fn same_color(&self, other: &HexColor) -> bool {
        self.to_rgb() == other.to_rgb()
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for HexColor {
    type Err = HexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for HexColor {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
