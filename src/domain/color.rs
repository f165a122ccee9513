use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Display color of a task, stored as "#rrggbb"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// A random pastel: a random color mixed half-and-half with white
    pub fn random() -> Self {
        let bytes = Uuid::new_v4().into_bytes();
        Color::new(bytes[0], bytes[5], bytes[11]).mix(Color::WHITE)
    }

    /// Average of two colors, channel by channel
    pub fn mix(self, other: Color) -> Self {
        let avg = |a: u8, b: u8| ((a as u16 + b as u16) / 2) as u8;
        Color::new(avg(self.r, other.r), avg(self.g, other.g), avg(self.b, other.b))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#')?;
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Color::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value).ok_or_else(|| format!("Invalid color: {}", value))
    }
}
