//! Dominant period of a 1-D tick profile.

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;
use serde::{Deserialize, Serialize};

use crate::{RulerError, RulerParams};

/// Relative tolerance under which two spectral peaks count as equal.
///
/// A train of one-pixel spikes has flat harmonics; the tie goes to the
/// lowest frequency so the fundamental wins over its multiples.
const PEAK_TIE_TOLERANCE: f64 = 1e-9;

/// Strongest periodicity found in a signal.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Periodicity {
    /// Period in samples (`1 / frequency`).
    pub period: f64,
    /// Frequency in cycles per sample.
    pub frequency: f64,
    /// Winning one-sided DFT bin.
    pub bin: usize,
    pub magnitude: f64,
}

/// Find the dominant period of `signal` from its one-sided spectrum.
///
/// The lowest `params.skip_low_bins` bins are ignored.
pub fn dominant_period(signal: &[f64], params: &RulerParams) -> Result<Periodicity, RulerError> {
    let n = signal.len();
    let one_sided = n / 2 + 1;
    if n < 2 || one_sided <= params.skip_low_bins {
        return Err(RulerError::SignalTooShort {
            len: n,
            skip: params.skip_low_bins,
        });
    }

    let mut buf: Vec<Complex<f64>> = signal
        .iter()
        .map(|&v| {
            let v = if params.threshold_signal {
                if v > 0.0 {
                    1.0
                } else {
                    0.0
                }
            } else {
                v
            };
            Complex::new(v, 0.0)
        })
        .collect();
    if buf.iter().all(|c| c.re == 0.0) {
        return Err(RulerError::FlatSignal);
    }

    let mut planner = FftPlanner::<f64>::new();
    planner.plan_fft_forward(n).process(&mut buf);

    let magnitudes: Vec<f64> = buf[..one_sided].iter().map(|c| c.norm()).collect();
    let peak = magnitudes[params.skip_low_bins..]
        .iter()
        .copied()
        .fold(0.0, f64::max);
    // Rounding noise of the transform scales with the DC term.
    if peak <= 1e-9 * magnitudes[0].max(1.0) {
        return Err(RulerError::NoSpectralPeak);
    }

    let floor = peak * (1.0 - PEAK_TIE_TOLERANCE);
    let bin = (params.skip_low_bins..one_sided)
        .find(|&k| magnitudes[k] >= floor)
        .ok_or(RulerError::NoSpectralPeak)?;

    let frequency = bin as f64 / n as f64;
    Ok(Periodicity {
        period: 1.0 / frequency,
        frequency,
        bin,
        magnitude: magnitudes[bin],
    })
}
