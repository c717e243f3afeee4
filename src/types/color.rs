// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! RGB(W) color type with hex parsing.
//!
//! WLED reports segment colors as arrays of 3 or 4 bytes (`[255, 170, 0]` or
//! `[64, 64, 64, 64]`). Some builds report them as hex strings instead
//! (`"#FFAA00"`); both forms decode into the same [`Color`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::ValueError;

/// RGB color with an optional white channel, 8-bit per channel.
///
/// # Examples
///
/// ```
/// use wled_lib::types::Color;
///
/// let orange = Color::rgb(255, 170, 0);
/// assert_eq!(orange.white(), None);
///
/// let warm = Color::rgbw(64, 64, 64, 200);
/// assert_eq!(warm.white(), Some(200));
///
/// let parsed = Color::from_hex("#ffaa00").unwrap();
/// assert_eq!(parsed, orange);
/// assert_eq!(parsed.to_hex_with_hash(), "#FFAA00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    red: u8,
    green: u8,
    blue: u8,
    white: Option<u8>,
}

impl Color {
    /// Black, the value of every color slot a segment does not report.
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    /// Creates an RGB color.
    #[must_use]
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red,
            green,
            blue,
            white: None,
        }
    }

    /// Creates an RGBW color.
    #[must_use]
    pub const fn rgbw(red: u8, green: u8, blue: u8, white: u8) -> Self {
        Self {
            red,
            green,
            blue,
            white: Some(white),
        }
    }

    /// Parses a color from a `#RRGGBB` (or `RRGGBB`) hex string.
    ///
    /// Only the six digit form is accepted. Any other length is rejected
    /// rather than guessed at.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidHexColor` if the string is not six hex digits.
    pub fn from_hex(hex: &str) -> Result<Self, ValueError> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(ValueError::InvalidHexColor(hex.to_string()));
        }

        let red = parse_hex_pair(&digits[0..2])?;
        let green = parse_hex_pair(&digits[2..4])?;
        let blue = parse_hex_pair(&digits[4..6])?;
        Ok(Self::rgb(red, green, blue))
    }

    /// Decodes one entry of a segment `col` array.
    ///
    /// Accepts a 3/4 element byte array or a hex string. Returns `None` for
    /// anything else, including out-of-range channel values.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(hex) => Self::from_hex(hex).ok(),
            Value::Array(channels) => {
                let bytes = channels
                    .iter()
                    .map(|c| c.as_u64().and_then(|c| u8::try_from(c).ok()))
                    .collect::<Option<Vec<u8>>>()?;
                match bytes.as_slice() {
                    [r, g, b] => Some(Self::rgb(*r, *g, *b)),
                    [r, g, b, w] => Some(Self::rgbw(*r, *g, *b, *w)),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// Returns the red component.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Returns the green component.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Returns the blue component.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }

    /// Returns the white component, if this is an RGBW color.
    #[must_use]
    pub const fn white(&self) -> Option<u8> {
        self.white
    }

    /// Returns the color as a hex string with the hash prefix (RGB only).
    #[must_use]
    pub fn to_hex_with_hash(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }

    /// Returns the channels as they appear in the JSON API.
    #[must_use]
    pub fn to_channels(&self) -> Vec<u8> {
        let mut channels = vec![self.red, self.green, self.blue];
        if let Some(white) = self.white {
            channels.push(white);
        }
        channels
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.white {
            Some(w) => write!(f, "({}, {}, {}, {w})", self.red, self.green, self.blue),
            None => write!(f, "({}, {}, {})", self.red, self.green, self.blue),
        }
    }
}

impl FromStr for Color {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from((red, green, blue): (u8, u8, u8)) -> Self {
        Self::rgb(red, green, blue)
    }
}

impl From<(u8, u8, u8, u8)> for Color {
    fn from((red, green, blue, white): (u8, u8, u8, u8)) -> Self {
        Self::rgbw(red, green, blue, white)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_channels().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(&value)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid color: {value}")))
    }
}

/// The three color slots of a segment.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use wled_lib::types::{Color, SegmentColors};
///
/// let colors = SegmentColors::from_json(&json!([[255, 0, 0], "#00FF00"]));
/// assert_eq!(colors.primary, Color::rgb(255, 0, 0));
/// assert_eq!(colors.secondary, Color::rgb(0, 255, 0));
/// assert_eq!(colors.tertiary, Color::BLACK);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct SegmentColors {
    /// Primary (foreground) color.
    pub primary: Color,
    /// Secondary (background) color.
    pub secondary: Color,
    /// Tertiary color.
    pub tertiary: Color,
}

impl SegmentColors {
    /// Decodes a segment `col` array.
    ///
    /// Never fails: missing, malformed or extra entries leave the
    /// corresponding slots black.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        let mut slots = [Color::BLACK; 3];
        if let Some(entries) = value.as_array() {
            for (slot, entry) in slots.iter_mut().zip(entries) {
                if let Some(color) = Color::from_json(entry) {
                    *slot = color;
                }
            }
        }
        let [primary, secondary, tertiary] = slots;
        Self {
            primary,
            secondary,
            tertiary,
        }
    }

    /// Returns the slots in API order.
    #[must_use]
    pub fn as_array(&self) -> [Color; 3] {
        [self.primary, self.secondary, self.tertiary]
    }
}

// Helper function to parse a two-character hex pair
fn parse_hex_pair(s: &str) -> Result<u8, ValueError> {
    u8::from_str_radix(s, 16).map_err(|_| ValueError::InvalidHexColor(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hex_is_case_insensitive() {
        assert_eq!(Color::from_hex("#ff8000"), Ok(Color::rgb(255, 128, 0)));
        assert_eq!(Color::from_hex("FF8000"), Ok(Color::rgb(255, 128, 0)));
    }

    #[test]
    fn hex_rejects_other_lengths() {
        assert!(Color::from_hex("#F00").is_err());
        assert!(Color::from_hex("#FF000000").is_err());
        assert!(Color::from_hex("#GG0000").is_err());
        assert!(Color::from_hex("").is_err());
    }

    #[test]
    fn decodes_tuples() {
        assert_eq!(
            Color::from_json(&json!([1, 2, 3])),
            Some(Color::rgb(1, 2, 3))
        );
        assert_eq!(
            Color::from_json(&json!([1, 2, 3, 4])),
            Some(Color::rgbw(1, 2, 3, 4))
        );
        assert_eq!(Color::from_json(&json!([1, 2])), None);
        assert_eq!(Color::from_json(&json!([1, 2, 300])), None);
        assert_eq!(Color::from_json(&json!(null)), None);
    }

    #[test]
    fn segment_colors_always_three() {
        for raw in [
            json!([]),
            json!([[1, 1, 1]]),
            json!([[1, 1, 1], [2, 2, 2]]),
            json!([[1, 1, 1], [2, 2, 2], [3, 3, 3]]),
            json!("not an array"),
        ] {
            let colors = SegmentColors::from_json(&raw);
            assert_eq!(colors.as_array().len(), 3);
        }

        let colors = SegmentColors::from_json(&json!([[1, 1, 1]]));
        assert_eq!(colors.secondary, Color::BLACK);
        assert_eq!(colors.tertiary, Color::BLACK);
    }

    #[test]
    fn segment_colors_mixed_entries() {
        let colors = SegmentColors::from_json(&json!(["#0000FF", [10, 20, 30, 40], "bogus"]));
        assert_eq!(colors.primary, Color::rgb(0, 0, 255));
        assert_eq!(colors.secondary, Color::rgbw(10, 20, 30, 40));
        assert_eq!(colors.tertiary, Color::BLACK);
    }

    #[test]
    fn serializes_as_channel_array() {
        assert_eq!(
            serde_json::to_value(Color::rgbw(1, 2, 3, 4)).unwrap(),
            json!([1, 2, 3, 4])
        );
        let color: Color = serde_json::from_value(json!("#010203")).unwrap();
        assert_eq!(color, Color::rgb(1, 2, 3));
    }
}
