//! Configuration parameters for the feature pipeline.

use serde::{Deserialize, Serialize};

/// Tunable parameters for loudness estimation and chroma reduction.
///
/// The defaults reproduce the behavior the extractor was calibrated
/// with; change them only with a way to listen to the result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// User-controlled gain (default: 5.0).
    ///
    /// Applied twice: once to the loudness peak and again on top of the
    /// per-frame chroma normalization. The second application lets
    /// several pitch classes sit at the visible ceiling at once instead
    /// of always exactly one. A front-end slider typically offers
    /// 1.0-20.0; the core only requires a positive value.
    pub sensitivity: f32,

    /// Leading spectrum bins excluded from the loudness peak (default: 4).
    /// These carry device/DC-offset energy rather than sound.
    pub skip_bins: usize,

    /// Activity gate on the raw amplified loudness (default: 0.1).
    /// At or below this value the chroma vector decays instead of being
    /// recomputed; the comparison is inclusive.
    pub activity_threshold: f32,

    /// Per-frame multiplier applied to the previous chroma vector while
    /// the gate is closed (default: 0.8). Gives a fade-out on silence
    /// rather than an instant drop to zero.
    pub decay_factor: f32,

    /// First spectrum bin considered for chroma accumulation, inclusive
    /// (default: 10). Bins below are treated as rumble.
    pub low_cut: usize,

    /// Last spectrum bin considered for chroma accumulation, inclusive
    /// (default: 500). Bins above contribute noise, not pitch.
    pub high_cut: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sensitivity: 5.0,
            skip_bins: 4,
            activity_threshold: 0.1,
            decay_factor: 0.8,
            low_cut: 10,
            high_cut: 500,
        }
    }
}
