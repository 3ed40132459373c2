//! # Spectrum Analysis Module
//!
//! Turns fixed-length sample buffers into magnitude spectra for the
//! feature pipeline. Each buffer is DC-centered, Hann-windowed and run
//! through a forward FFT; only the first half of the spectrum (up to
//! Nyquist) is kept, so a buffer of `n` samples yields `n / 2`
//! magnitude bins.
//!
//! The FFT plan and window table are built once per analyzer; the
//! per-buffer work is allocation-light enough for the capture thread.

use rustfft::{Fft, FftPlanner, num_complex::Complex};
use std::f32::consts::PI;
use std::sync::Arc;

/// Reusable sample-buffer-to-magnitudes transform.
pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    scratch: Vec<Complex<f32>>,
}

impl SpectrumAnalyzer {
    /// Plans an FFT for buffers of exactly `buffer_len` samples.
    ///
    /// # Panics
    /// If `buffer_len` is below 2 (no spectrum to speak of).
    pub fn new(buffer_len: usize) -> Self {
        assert!(buffer_len >= 2, "buffer length must be at least 2");
        let mut planner = FftPlanner::new();
        Self {
            fft: planner.plan_fft_forward(buffer_len),
            window: hann_window(buffer_len),
            scratch: vec![Complex { re: 0.0, im: 0.0 }; buffer_len],
        }
    }

    /// Number of magnitude bins produced per buffer.
    pub fn spectrum_len(&self) -> usize {
        self.window.len() / 2
    }

    /// Computes the magnitude spectrum of one sample buffer.
    ///
    /// The signal is centered around zero first (a DC component would
    /// leak into the lowest bins and read as permanent low-frequency
    /// energy), then tapered with a Hann window to limit spectral
    /// leakage.
    ///
    /// # Panics
    /// If `samples` does not match the planned buffer length.
    pub fn magnitudes(&mut self, samples: &[f32]) -> Vec<f32> {
        assert!(
            samples.len() == self.window.len(),
            "expected buffer of length {}, got {}",
            self.window.len(),
            samples.len()
        );

        let mean = samples.iter().sum::<f32>() / samples.len() as f32;
        for ((slot, &sample), &weight) in self.scratch.iter_mut().zip(samples).zip(&self.window) {
            *slot = Complex {
                re: (sample - mean) * weight,
                im: 0.0,
            };
        }

        self.fft.process(&mut self.scratch);

        self.scratch
            .iter()
            .take(self.spectrum_len())
            .map(|c| c.norm())
            .collect()
    }
}

fn hann_window(len: usize) -> Vec<f32> {
    let denominator = (len - 1) as f32;
    (0..len)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / denominator).cos()))
        .collect()
}
