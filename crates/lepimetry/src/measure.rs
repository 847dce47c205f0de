//! Landmark distances in pixels and millimeters.

use std::collections::BTreeMap;

use lepimetry_core::{FailureKind, Pixel};
use lepimetry_ruler::TickConvention;
use lepimetry_wings::LandmarkSet;
use serde::{Deserialize, Serialize};

/// Parameters for [`MeasurementCalculator`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MeasurementParams {
    /// Physical interval between adjacent ruler ticks.
    pub convention: TickConvention,
    /// Decimal digits kept in reported values.
    pub decimals: u32,
}

impl Default for MeasurementParams {
    fn default() -> Self {
        Self {
            convention: TickConvention::HalfMillimeter,
            decimals: 2,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum MeasureError {
    #[error("tick spacing must be positive and finite, got {tick_spacing}")]
    InvalidScale { tick_spacing: f64 },
}

impl MeasureError {
    pub fn kind(&self) -> FailureKind {
        FailureKind::DegenerateSignal
    }
}

/// The six named distances of a specimen, in one unit.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DistanceSet {
    /// Left wing length (outer to inner).
    pub dist_l: f64,
    /// Right wing length (outer to inner).
    pub dist_r: f64,
    pub dist_l_center: f64,
    pub dist_r_center: f64,
    /// Outer-to-outer wing span.
    pub dist_span: f64,
    /// Inner-to-inner shoulder width.
    pub dist_shoulder: f64,
}

impl DistanceSet {
    pub const KEYS: [&'static str; 6] = [
        "dist_l",
        "dist_r",
        "dist_l_center",
        "dist_r_center",
        "dist_span",
        "dist_shoulder",
    ];

    /// Raw Euclidean pixel distances between landmarks.
    pub fn from_landmarks(lm: &LandmarkSet) -> Self {
        let d = |a: Pixel, b: Pixel| a.distance(b);
        Self {
            dist_l: d(lm.outer_pix_l, lm.inner_pix_l),
            dist_r: d(lm.outer_pix_r, lm.inner_pix_r),
            dist_l_center: d(lm.outer_pix_l, lm.body_center),
            dist_r_center: d(lm.outer_pix_r, lm.body_center),
            dist_span: d(lm.outer_pix_l, lm.outer_pix_r),
            dist_shoulder: d(lm.inner_pix_l, lm.inner_pix_r),
        }
    }

    pub fn values(&self) -> [f64; 6] {
        [
            self.dist_l,
            self.dist_r,
            self.dist_l_center,
            self.dist_r_center,
            self.dist_span,
            self.dist_shoulder,
        ]
    }

    fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            dist_l: f(self.dist_l),
            dist_r: f(self.dist_r),
            dist_l_center: f(self.dist_l_center),
            dist_r_center: f(self.dist_r_center),
            dist_span: f(self.dist_span),
            dist_shoulder: f(self.dist_shoulder),
        }
    }

    /// Keyed view for CSV/JSON writers.
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        Self::KEYS
            .iter()
            .zip(self.values())
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }
}

/// Pixel and millimeter distances of one specimen.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Measurements {
    pub pixels: DistanceSet,
    pub millimeters: DistanceSet,
}

/// Converts landmarks into reported distances.
#[derive(Clone, Debug, Default)]
pub struct MeasurementCalculator {
    params: MeasurementParams,
}

impl MeasurementCalculator {
    pub fn new(params: MeasurementParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &MeasurementParams {
        &self.params
    }

    /// Measure `landmarks` given the ruler's tick spacing in pixels.
    ///
    /// Millimeters are pixels divided by `tick_spacing / tick_mm`, so with
    /// half-millimeter ticks one millimeter spans `2 * tick_spacing` pixels.
    pub fn measure(
        &self,
        landmarks: &LandmarkSet,
        tick_spacing: f64,
    ) -> Result<Measurements, MeasureError> {
        if !(tick_spacing.is_finite() && tick_spacing > 0.0) {
            return Err(MeasureError::InvalidScale { tick_spacing });
        }
        let px_per_mm = tick_spacing / self.params.convention.tick_mm();

        let raw = DistanceSet::from_landmarks(landmarks);
        let factor = 10f64.powi(self.params.decimals as i32);
        let round = |v: f64| (v * factor).round() / factor;

        Ok(Measurements {
            pixels: raw.map(round),
            millimeters: raw.map(|v| round(v / px_per_mm)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn landmarks() -> LandmarkSet {
        LandmarkSet {
            outer_pix_l: Pixel::new(0, -4),
            inner_pix_l: Pixel::new(0, -1),
            outer_pix_r: Pixel::new(0, 5),
            inner_pix_r: Pixel::new(0, 1),
            body_center: Pixel::new(0, 0),
        }
    }

    fn expected_pixels() -> DistanceSet {
        DistanceSet {
            dist_l: 3.0,
            dist_r: 4.0,
            dist_l_center: 4.0,
            dist_r_center: 5.0,
            dist_span: 9.0,
            dist_shoulder: 2.0,
        }
    }

    fn calculator(convention: TickConvention) -> MeasurementCalculator {
        MeasurementCalculator::new(MeasurementParams {
            convention,
            ..MeasurementParams::default()
        })
    }

    #[test]
    fn unit_spacing_with_millimeter_ticks_keeps_values() {
        let m = calculator(TickConvention::Millimeter)
            .measure(&landmarks(), 1.0)
            .expect("valid scale");
        assert_eq!(m.pixels, expected_pixels());
        assert_eq!(m.millimeters, expected_pixels());
    }

    #[test]
    fn doubled_spacing_with_millimeter_ticks_halves_values() {
        let m = calculator(TickConvention::Millimeter)
            .measure(&landmarks(), 2.0)
            .expect("valid scale");
        assert_eq!(m.pixels, expected_pixels());
        assert_eq!(
            m.millimeters.values(),
            [1.5, 2.0, 2.0, 2.5, 4.5, 1.0]
        );
    }

    #[test]
    fn half_millimeter_ticks_scale_every_distance_alike() {
        let calc = MeasurementCalculator::default();
        let one = calc.measure(&landmarks(), 1.0).expect("valid scale");
        let two = calc.measure(&landmarks(), 2.0).expect("valid scale");
        for ((px, mm1), mm2) in one
            .pixels
            .values()
            .into_iter()
            .zip(one.millimeters.values())
            .zip(two.millimeters.values())
        {
            assert_relative_eq!(mm1, px / 2.0);
            assert_relative_eq!(mm2, px / 4.0);
        }
    }

    #[test]
    fn values_are_rounded() {
        let lm = LandmarkSet {
            outer_pix_l: Pixel::new(0, 0),
            inner_pix_l: Pixel::new(1, 1),
            ..landmarks()
        };
        let m = calculator(TickConvention::Millimeter)
            .measure(&lm, 3.0)
            .expect("valid scale");
        assert_eq!(m.pixels.dist_l, 1.41);
        assert_eq!(m.millimeters.dist_l, 0.47);
    }

    #[test]
    fn non_positive_spacing_is_rejected() {
        let calc = MeasurementCalculator::default();
        assert!(calc.measure(&landmarks(), 0.0).is_err());
        assert!(calc.measure(&landmarks(), f64::NAN).is_err());
    }

    #[test]
    fn keyed_map_uses_fixed_names() {
        let map = expected_pixels().to_map();
        assert_eq!(map.len(), 6);
        assert_eq!(map["dist_span"], 9.0);
        assert_eq!(map["dist_shoulder"], 2.0);
    }
}
