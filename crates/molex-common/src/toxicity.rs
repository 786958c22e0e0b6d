//! Toxicity classification and the colour policy shared by the 2-D views and
//! the 3-D recolor command.
//!
//! | Level      | CSS       | RGB            |
//! |------------|-----------|----------------|
//! | `Low`      | `#22c55e` | (34, 197, 94)  |
//! | `Moderate` | `#f59e0b` | (245, 158, 11) |
//! | `High`     | `#ef4444` | (239, 68, 68)  |
//! | other      | `#9ca3af` | (156, 163, 175)|

use serde::{Deserialize, Serialize};
use std::fmt;

/// Toxicity level of a compound as authored in the assay CSV.
///
/// Parsing is case-sensitive and never fails: anything other than the three
/// known labels is kept verbatim as [`Toxicity::Unclassified`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Toxicity {
    #[default]
    Low,
    Moderate,
    High,
    Unclassified(String),
}

impl Toxicity {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "Low" => Toxicity::Low,
            "Moderate" => Toxicity::Moderate,
            "High" => Toxicity::High,
            other => Toxicity::Unclassified(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Toxicity::Low => "Low",
            Toxicity::Moderate => "Moderate",
            Toxicity::High => "High",
            Toxicity::Unclassified(raw) => raw,
        }
    }

    pub fn is_classified(&self) -> bool {
        !matches!(self, Toxicity::Unclassified(_))
    }
}

impl fmt::Display for Toxicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for Toxicity {
    fn from(raw: String) -> Self {
        Toxicity::parse(&raw)
    }
}

impl From<Toxicity> for String {
    fn from(t: Toxicity) -> Self {
        t.label().to_string()
    }
}

/// 8-bit RGB triple as consumed by the visualization engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Packed `0xRRGGBB` form.
    pub fn to_hex_u32(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    pub fn to_css(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Both encodings of one toxicity colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToxicityColor {
    /// CSS hex colour for inline SVG fills.
    pub css: &'static str,
    /// Stylesheet class used by badges and legend swatches.
    pub class: &'static str,
    /// Colour sent to the 3-D engine.
    pub rgb: Rgb,
}

pub const LOW_COLOR: ToxicityColor = ToxicityColor {
    css: "#22c55e",
    class: "tox-low",
    rgb: Rgb::new(34, 197, 94),
};

pub const MODERATE_COLOR: ToxicityColor = ToxicityColor {
    css: "#f59e0b",
    class: "tox-moderate",
    rgb: Rgb::new(245, 158, 11),
};

pub const HIGH_COLOR: ToxicityColor = ToxicityColor {
    css: "#ef4444",
    class: "tox-high",
    rgb: Rgb::new(239, 68, 68),
};

/// Neutral colour for values outside the closed enumeration.
pub const FALLBACK_COLOR: ToxicityColor = ToxicityColor {
    css: "#9ca3af",
    class: "tox-unknown",
    rgb: Rgb::new(156, 163, 175),
};

pub fn color_for(toxicity: &Toxicity) -> ToxicityColor {
    match toxicity {
        Toxicity::Low => LOW_COLOR,
        Toxicity::Moderate => MODERATE_COLOR,
        Toxicity::High => HIGH_COLOR,
        Toxicity::Unclassified(_) => FALLBACK_COLOR,
    }
}
