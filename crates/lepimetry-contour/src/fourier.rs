//! Band-limited Fourier smoothing of closed contours.
//!
//! A contour `(x_j, y_j)`, `j = 0..N`, is read as the complex sequence
//! `z_j = x_j + i*y_j`. Its DFT coefficient for frequency `k` is
//! `c_k = (1/N) * sum_j z_j * exp(-2*pi*i*k*j/N)`. Smoothing keeps the
//! coefficients with `|k| <= descriptors / 2` and inverts.

use std::f64::consts::TAU;

use nalgebra::Point2;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::ContourError;

/// Parameters for contour smoothing.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SmoothingParams {
    /// Width of the kept frequency band. Frequencies `-d/2..=d/2` survive;
    /// an even value keeps the same band as the next odd one.
    pub descriptors: usize,
}

impl Default for SmoothingParams {
    fn default() -> Self {
        Self { descriptors: 45 }
    }
}

impl SmoothingParams {
    #[inline]
    fn half_band(&self) -> i64 {
        (self.descriptors / 2) as i64
    }
}

/// Low-frequency Fourier descriptors of a closed contour.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FourierDescriptors {
    /// Frequencies in the order `0, 1, -1, 2, -2, ...`.
    pub frequencies: Vec<i64>,
    /// Coefficients `c_k` matching `frequencies`, stored as `[re, im]`.
    pub coefficients: Vec<[f64; 2]>,
    /// Number of contour points the descriptors were computed from.
    pub source_len: usize,
}

impl FourierDescriptors {
    /// Compute the band-limited descriptors of `points`.
    pub fn from_points(points: &[Point2<f64>], params: &SmoothingParams) -> Result<Self, ContourError> {
        let spectrum = forward_spectrum(points)?;
        let n = points.len();
        let frequencies = symmetric_frequencies(params.half_band().min((n as i64 - 1) / 2));
        let coefficients = frequencies
            .iter()
            .map(|&k| {
                let c = spectrum[bin_of(k, n)] / n as f64;
                [c.re, c.im]
            })
            .collect();
        Ok(Self {
            frequencies,
            coefficients,
            source_len: n,
        })
    }

    /// Evaluate the truncated series at `n_points` evenly spaced parameters.
    ///
    /// `n_points == source_len` reproduces [`smooth_contour`]; other values
    /// resample the smoothed curve.
    pub fn reconstruct(&self, n_points: usize) -> Vec<Point2<f64>> {
        (0..n_points)
            .map(|i| {
                let t = i as f64 / n_points as f64;
                let z = self
                    .frequencies
                    .iter()
                    .zip(&self.coefficients)
                    .fold(Complex::new(0.0, 0.0), |acc, (&k, &[re, im])| {
                        acc + Complex::new(re, im) * Complex::from_polar(1.0, TAU * k as f64 * t)
                    });
                Point2::new(z.re, z.im)
            })
            .collect()
    }

    /// Scale- and rotation-invariant magnitudes `|c_k| / |c_1|` for every
    /// descriptor after `c_0` and `c_1`.
    ///
    /// `None` when the first harmonic vanishes.
    pub fn normalized_magnitudes(&self) -> Option<Vec<f64>> {
        let [re, im] = *self.coefficients.get(1)?;
        let base = re.hypot(im);
        if base <= f64::EPSILON {
            return None;
        }
        Some(
            self.coefficients
                .iter()
                .skip(2)
                .map(|&[re, im]| re.hypot(im) / base)
                .collect(),
        )
    }
}

/// Smooth a closed contour by zeroing every DFT bin outside the kept band.
///
/// The output has one point per input point. Smoothing is a projection:
/// applying it twice with the same parameters gives the same contour.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(points, params), fields(n = points.len(), descriptors = params.descriptors))
)]
pub fn smooth_contour(
    points: &[Point2<f64>],
    params: &SmoothingParams,
) -> Result<Vec<Point2<f64>>, ContourError> {
    let n = points.len();
    let mut spectrum = forward_spectrum(points)?;
    let half = params.half_band();

    for (bin, c) in spectrum.iter_mut().enumerate() {
        if frequency_of(bin, n).abs() > half {
            *c = Complex::new(0.0, 0.0);
        }
    }

    let mut planner = FftPlanner::<f64>::new();
    planner.plan_fft_inverse(n).process(&mut spectrum);

    let scale = 1.0 / n as f64;
    Ok(spectrum
        .into_iter()
        .map(|z| Point2::new(z.re * scale, z.im * scale))
        .collect())
}

fn forward_spectrum(points: &[Point2<f64>]) -> Result<Vec<Complex<f64>>, ContourError> {
    if points.is_empty() {
        return Err(ContourError::EmptyBoundary);
    }
    let mut buf: Vec<Complex<f64>> = points.iter().map(|p| Complex::new(p.x, p.y)).collect();
    let mut planner = FftPlanner::<f64>::new();
    planner.plan_fft_forward(buf.len()).process(&mut buf);
    Ok(buf)
}

/// Signed frequency of DFT bin `bin` in a length-`n` transform.
#[inline]
fn frequency_of(bin: usize, n: usize) -> i64 {
    if bin <= n / 2 {
        bin as i64
    } else {
        bin as i64 - n as i64
    }
}

#[inline]
fn bin_of(k: i64, n: usize) -> usize {
    k.rem_euclid(n as i64) as usize
}

fn symmetric_frequencies(half: i64) -> Vec<i64> {
    let mut out = vec![0];
    for k in 1..=half {
        out.push(k);
        out.push(-k);
    }
    out
}
