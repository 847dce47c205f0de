use serde::{Deserialize, Serialize};

/// How the tick band is collapsed into a 1-D signal.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Projection {
    /// Foreground count per column.
    #[default]
    Sum,
    /// Foreground fraction per column.
    Mean,
}

/// Physical interval between two adjacent detected ticks.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickConvention {
    /// Ticks every 0.5 mm: one millimeter spans `2 * tick_spacing` pixels.
    #[default]
    HalfMillimeter,
    /// Ticks every 1 mm: one millimeter spans `tick_spacing` pixels.
    Millimeter,
}

impl TickConvention {
    /// Tick interval in millimeters.
    #[inline]
    pub fn tick_mm(self) -> f64 {
        match self {
            TickConvention::HalfMillimeter => 0.5,
            TickConvention::Millimeter => 1.0,
        }
    }
}

/// Parameters for ruler scale estimation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RulerParams {
    /// Number of lowest DFT bins (DC and near-DC leakage) ignored.
    pub skip_low_bins: usize,
    /// Threshold the projection to 0/1 so the spectrum follows tick
    /// frequency rather than tick length.
    pub threshold_signal: bool,
    pub projection: Projection,
    /// Kept row band, as fractions of the ruler crop height.
    pub band_rows: [f32; 2],
    /// Kept column band, as fractions of the ruler crop width.
    pub band_cols: [f32; 2],
    /// Components rounder than this and larger than the mean component
    /// are treated as printed numerals and blanked.
    pub numeral_eccentricity: f64,
    /// First tick column: first column whose mean occupancy exceeds this
    /// fraction of the maximum.
    pub first_tick_fraction: f64,
}

impl Default for RulerParams {
    fn default() -> Self {
        Self {
            skip_low_bins: 10,
            threshold_signal: true,
            projection: Projection::Sum,
            band_rows: [0.1, 0.75],
            band_cols: [0.1, 0.9],
            numeral_eccentricity: 0.99,
            first_tick_fraction: 0.9,
        }
    }
}
