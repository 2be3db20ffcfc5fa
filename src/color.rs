use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Chart palettes
// ---------------------------------------------------------------------------

/// How a chart colours its categories or series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Palette {
    /// Label → hex colour; unknown labels get a generated colour.
    Fixed(&'static [(&'static str, &'static str)]),
    /// Hex colours assigned to labels in order, cycling.
    Sequence(&'static [&'static str]),
    /// Evenly spaced hues.
    Generated,
}

pub const TARGET_COUNTS: Palette = Palette::Fixed(&[("Repaid", "#06e02e"), ("Default", "#f60909")]);

pub const GENDER: Palette = Palette::Fixed(&[("M", "#0c48ee"), ("F", "#f705e3")]);

pub const EDUCATION: Palette = Palette::Fixed(&[
    ("Secondary / secondary special", "#0b92ec"),
    ("Higher education", "#0fe769"),
    ("Incomplete higher", "#f29a0c"),
    ("Lower secondary", "#e73623"),
    ("Academic degree", "#ad31de"),
]);

pub const FAMILY_STATUS: Palette = Palette::Fixed(&[
    ("Single / not married", "#2e07f2"),
    ("Married", "#07f64f"),
    ("Civil marriage", "#f0091c"),
    ("Separated", "#e8ef08"),
    ("Widow", "#07f5f1"),
]);

pub const INCOME_BY_TARGET: Palette =
    Palette::Fixed(&[("Repaid", "#07f5f1"), ("Default", "#fb6305")]);

pub const CREDIT_BY_TARGET: Palette =
    Palette::Fixed(&[("Repaid", "#f50707"), ("Default", "#05f922")]);

pub const AGE_BY_TARGET: Palette = Palette::Fixed(&[("Repaid", "#1abc9c"), ("Default", "#8e44ad")]);

pub const EMPLOYMENT_BY_TARGET: Palette =
    Palette::Fixed(&[("Repaid", "#0A5FF2"), ("Default", "#F20707")]);

pub const CONTRACT_TYPE: Palette =
    Palette::Sequence(&["#7BC6E9", "#F58A9A", "#57F157", "#EB6BEB", "#F9D60E"]);

/// `#rrggbb` (or `rrggbb`) → colour.
pub fn parse_hex(hex: &str) -> Option<Color32> {
    let digits = hex.trim().trim_start_matches('#');
    if digits.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
    Some(Color32::from_rgb(channel(0)?, channel(2)?, channel(4)?))
}

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: category label → Color32
// ---------------------------------------------------------------------------

/// Maps the labels shown in one chart to colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map for `labels` under `palette`.
    pub fn new(palette: &Palette, labels: &[String]) -> Self {
        let generated = generate_palette(labels.len());
        let mapping = labels
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let fixed = match palette {
                    Palette::Fixed(entries) => entries
                        .iter()
                        .find(|(name, _)| *name == label.as_str())
                        .and_then(|(_, hex)| parse_hex(hex)),
                    Palette::Sequence(hexes) if !hexes.is_empty() => {
                        parse_hex(hexes[i % hexes.len()])
                    }
                    _ => None,
                };
                (label.clone(), fixed.unwrap_or(generated[i]))
            })
            .collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a given label.
    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping.get(label).copied().unwrap_or(self.default_color)
    }
}
