//! # Loudness Estimation Module
//!
//! Reduces a magnitude spectrum to a single peak-based loudness value.
//! The estimate drives the on-screen level meter, while the unclamped
//! amplified peak feeds the chroma reducer's activity gate.

/// Loudness derived from one magnitude frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Loudness {
    /// Amplified peak clamped to [0, 1], suitable for display.
    pub level: f32,
    /// Amplified peak before clamping. The activity gate compares this
    /// value against its threshold, so a frame pegged at full scale is
    /// still distinguishable from one barely above the gate.
    pub raw: f32,
}

/// Estimates loudness from a magnitude frame.
///
/// The first `skip_bins` bins are ignored: the lowest bins carry
/// device and DC-offset energy unrelated to actual sound, and including
/// them reads as a constantly lit meter on some hardware.
///
/// A frame with fewer than `skip_bins` elements yields the silence
/// result (level and raw both 0).
///
/// # Arguments
/// * `frame` - Magnitude spectrum, one value per frequency bin
/// * `sensitivity` - User-controlled gain applied to the peak
/// * `skip_bins` - Number of leading bins to exclude
pub fn estimate_loudness(frame: &[f32], sensitivity: f32, skip_bins: usize) -> Loudness {
    let peak = frame
        .get(skip_bins..)
        .unwrap_or(&[])
        .iter()
        .fold(0.0f32, |peak, &magnitude| peak.max(magnitude));

    let raw = peak * sensitivity;
    Loudness {
        level: raw.min(1.0),
        raw,
    }
}
