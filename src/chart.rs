//! Chart models for a ranked view.
//!
//! These hold everything a renderer needs (labels, values, proportions,
//! angles and colors) so drawing code only maps them to pixels.

use crate::ranking::RankedView;
use crate::table::format_number;
use std::f32::consts::TAU;

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Linear blend; `t` is clamped to [0, 1].
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }

    /// Channels as floats in [0, 1].
    pub fn to_f32(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }
}

/// Dashboard blue, the low end of the bar color scale.
pub const SCALE_LOW: Rgb = Rgb::new(0x03, 0x3e, 0x59);
/// Dashboard amber, the high end of the bar color scale.
pub const SCALE_HIGH: Rgb = Rgb::new(0xf4, 0xa3, 0x03);

/// Sequential orange palette used for pie slices, light to dark.
pub const ORANGES: [Rgb; 9] = [
    Rgb::new(255, 245, 235),
    Rgb::new(254, 230, 206),
    Rgb::new(253, 208, 162),
    Rgb::new(253, 174, 107),
    Rgb::new(253, 141, 60),
    Rgb::new(241, 105, 19),
    Rgb::new(217, 72, 1),
    Rgb::new(166, 54, 3),
    Rgb::new(127, 39, 4),
];

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: f64,
    /// Bar height relative to the tallest bar, in [0, 1]
    pub height: f32,
    pub color: Rgb,
}

/// One bar per view entry, in rank order.
#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub title: String,
    pub bars: Vec<Bar>,
    pub max_value: f64,
}

impl BarChart {
    pub fn from_view(view: &RankedView<'_>) -> Self {
        let values: Vec<f64> = view.values().collect();
        let max_value = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min_value = values.iter().copied().fold(f64::INFINITY, f64::min);
        let span = max_value - min_value;

        let bars = view
            .entries()
            .iter()
            .zip(values.iter())
            .map(|(entry, &value)| {
                let height = if max_value > 0.0 {
                    (value / max_value).max(0.0) as f32
                } else {
                    0.0
                };
                let t = if span > 0.0 {
                    ((value - min_value) / span) as f32
                } else {
                    1.0
                };
                Bar {
                    label: entry.record.name().to_string(),
                    value,
                    height,
                    color: SCALE_LOW.lerp(SCALE_HIGH, t),
                }
            })
            .collect();

        BarChart {
            title: view.category().label().to_string(),
            bars,
            max_value: if values.is_empty() { 0.0 } else { max_value },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub label: String,
    pub value: f64,
    /// Share of the total, in (0, 1]
    pub fraction: f64,
    /// Radians, clockwise from 12 o'clock
    pub start_angle: f32,
    pub end_angle: f32,
    pub color: Rgb,
}

impl Slice {
    /// Legend text, e.g. `"Asha 37.5%"`.
    pub fn legend(&self) -> String {
        format!("{} {:.1}%", self.label, self.fraction * 100.0)
    }
}

/// Each entry's share of the summed score. Entries scoring 0 or less get
/// no slice.
#[derive(Debug, Clone, PartialEq)]
pub struct PieChart {
    pub title: String,
    pub slices: Vec<Slice>,
    pub total: f64,
}

impl PieChart {
    pub fn from_view(view: &RankedView<'_>) -> Self {
        let positive: Vec<(String, f64)> = view
            .entries()
            .iter()
            .map(|e| (e.record.name().to_string(), e.score(view.category())))
            .filter(|(_, v)| *v > 0.0)
            .collect();
        let total: f64 = positive.iter().map(|(_, v)| v).sum();

        let mut slices = Vec::with_capacity(positive.len());
        let mut angle = 0.0f32;
        let palette_len = ORANGES.len();

        for (idx, (label, value)) in positive.into_iter().enumerate() {
            let fraction = value / total;
            let sweep = (fraction as f32) * TAU;
            // Darkest shade goes to the largest slice.
            let color = ORANGES[palette_len - 1 - (idx % palette_len)];
            slices.push(Slice {
                label,
                value,
                fraction,
                start_angle: angle,
                end_angle: angle + sweep,
                color,
            });
            angle += sweep;
        }

        PieChart {
            title: format!("Score contribution: {}", view.category().label()),
            slices,
            total,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    /// Short summary for text front ends.
    pub fn describe(&self) -> String {
        if self.is_empty() {
            return "No positive scores to chart".to_string();
        }
        self.slices
            .iter()
            .map(Slice::legend)
            .collect::<Vec<_>>()
            .join(", ")
            + &format!(" (total {})", format_number(self.total))
    }
}
