//! # Chroma Reduction Module
//!
//! Folds a magnitude spectrum into a 12-bin pitch-class energy
//! distribution (chroma vector). Octaves collapse onto a single bin, so
//! 220 Hz, 440 Hz and 880 Hz all land on A. The reducer is the one
//! stateful stage of the pipeline: while the activity gate is closed it
//! decays its previous output instead of reading the spectrum, which
//! gives the display a fade-out on silence and keeps the vector
//! comparable frame to frame.

use crate::config::PipelineConfig;

/// Number of pitch classes in an octave.
pub const PITCH_CLASSES: usize = 12;

/// Display names per pitch class, index 0 = C .. 11 = B.
pub const PITCH_CLASS_NAMES: [&str; PITCH_CLASSES] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Maps a frequency in Hz to its equal-tempered pitch class.
///
/// Uses the MIDI convention (A4 = 440 Hz = note 69, class = note mod 12).
/// Returns `None` for non-positive frequencies, which have no pitch.
pub fn pitch_class_for_frequency(frequency: f32) -> Option<usize> {
    if frequency <= 0.0 {
        return None;
    }
    let midi_note = 69.0 + 12.0 * (frequency / 440.0).log2();
    // rem_euclid keeps the class in 0..12 for notes below MIDI 0.
    Some((midi_note.round() as i32).rem_euclid(PITCH_CLASSES as i32) as usize)
}

/// Stateful spectrum-to-chroma reducer.
///
/// Holds the last emitted vector across frames; frames must therefore be
/// fed in arrival order. Call [`ChromaReducer::reset`] when a capture
/// session stops so a later restart does not see stale energy.
#[derive(Debug, Clone, Default)]
pub struct ChromaReducer {
    last: [f32; PITCH_CLASSES],
}

impl ChromaReducer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently emitted chroma vector.
    pub fn last(&self) -> &[f32; PITCH_CLASSES] {
        &self.last
    }

    /// Reduces one magnitude frame to a chroma vector.
    ///
    /// `raw_loudness` is the *unclamped* amplified loudness peak from
    /// [`crate::loudness::estimate_loudness`]; the gate compares it
    /// against `config.activity_threshold` (inclusive, so a value exactly
    /// at the threshold still decays).
    ///
    /// While gated, the previous vector is multiplied by the decay factor
    /// and the frame is never read. Otherwise every bin in the configured
    /// band is mapped to its pitch class, energies are accumulated, and
    /// the result is max-normalized with the sensitivity re-applied as a
    /// second gain, each element clamped to [0, 1].
    pub fn update(
        &mut self,
        frame: &[f32],
        raw_loudness: f32,
        sample_rate: f32,
        config: &PipelineConfig,
    ) -> [f32; PITCH_CLASSES] {
        if raw_loudness <= config.activity_threshold {
            for value in self.last.iter_mut() {
                *value *= config.decay_factor;
            }
            return self.last;
        }

        // Hz per bin: the frame spans 0 Hz to Nyquist (sample_rate / 2).
        let bin_resolution = sample_rate / (2.0 * frame.len() as f32);

        let mut accumulator = [0.0f32; PITCH_CLASSES];
        for bin in config.low_cut..=config.high_cut {
            let Some(&magnitude) = frame.get(bin) else {
                break;
            };
            let frequency = bin as f32 * bin_resolution;
            let Some(class) = pitch_class_for_frequency(frequency) else {
                continue;
            };
            accumulator[class] += magnitude;
        }

        let max_energy = accumulator
            .iter()
            .fold(0.0f32, |max, &energy| max.max(energy));

        let mut chroma = [0.0f32; PITCH_CLASSES];
        if max_energy > 0.0 {
            for (out, &energy) in chroma.iter_mut().zip(accumulator.iter()) {
                *out = (energy / max_energy * config.sensitivity).min(1.0);
            }
        }

        self.last = chroma;
        chroma
    }

    /// Clears the stored vector. Must be called on session stop.
    pub fn reset(&mut self) {
        self.last = [0.0; PITCH_CLASSES];
    }
}
