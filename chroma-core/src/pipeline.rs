//! # Feature Pipeline Module
//!
//! Drives the two reduction stages over a stream of magnitude frames:
//! loudness estimation feeds the chroma reducer's activity gate, and the
//! reducer carries its vector across frames. One pipeline instance per
//! capture session, owned by a single thread; results are returned by
//! value so consumers never observe a half-updated vector.

use crate::FrameFeatures;
use crate::chroma::ChromaReducer;
use crate::config::PipelineConfig;
use crate::loudness::estimate_loudness;

/// Per-session reduction state: configuration, sample rate and the
/// reducer's carried chroma vector.
#[derive(Debug, Clone)]
pub struct FeaturePipeline {
    config: PipelineConfig,
    reducer: ChromaReducer,
    sample_rate: f32,
    frame_len: usize,
}

impl FeaturePipeline {
    /// Creates a pipeline for a capture session.
    ///
    /// `frame_len` is the magnitude frame length the session will
    /// deliver (spectrum bins, not audio samples); every frame passed to
    /// [`FeaturePipeline::process`] must have exactly this length.
    ///
    /// # Panics
    /// If `sample_rate` is not positive, `frame_len` is zero, or
    /// `config.sensitivity` is not positive. These are contract
    /// violations by the caller, not runtime conditions.
    pub fn new(sample_rate: f32, frame_len: usize, config: PipelineConfig) -> Self {
        assert!(
            sample_rate > 0.0,
            "sample rate must be positive, got {sample_rate}"
        );
        assert!(frame_len > 0, "frame length must be non-zero");
        assert!(
            config.sensitivity > 0.0,
            "sensitivity must be positive, got {}",
            config.sensitivity
        );

        Self {
            config,
            reducer: ChromaReducer::new(),
            sample_rate,
            frame_len,
        }
    }

    /// Reduces one magnitude frame to its features.
    ///
    /// Frames must arrive in capture order; the decay path depends on
    /// the previously emitted vector.
    ///
    /// # Panics
    /// If the frame length differs from the length the pipeline was
    /// built for. A wrong-length frame means the capture side is
    /// misconfigured, and processing it would silently shift every
    /// frequency mapping.
    pub fn process(&mut self, frame: &[f32]) -> FrameFeatures {
        assert!(
            frame.len() == self.frame_len,
            "expected magnitude frame of length {}, got {}",
            self.frame_len,
            frame.len()
        );

        let loudness = estimate_loudness(frame, self.config.sensitivity, self.config.skip_bins);
        let chroma = self
            .reducer
            .update(frame, loudness.raw, self.sample_rate, &self.config);

        FrameFeatures {
            loudness: loudness.level,
            chroma,
        }
    }

    /// Adjusts the gain between frames.
    ///
    /// # Panics
    /// If `sensitivity` is not positive.
    pub fn set_sensitivity(&mut self, sensitivity: f32) {
        assert!(
            sensitivity > 0.0,
            "sensitivity must be positive, got {sensitivity}"
        );
        self.config.sensitivity = sensitivity;
    }

    /// Clears the carried chroma vector. Called on session stop so a
    /// restart does not begin from stale energy.
    pub fn reset(&mut self) {
        self.reducer.reset();
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chroma::PITCH_CLASSES;

    const SAMPLE_RATE: f32 = 44_100.0;
    const FRAME_LEN: usize = 1024;

    #[test]
    #[should_panic(expected = "sample rate must be positive")]
    fn rejects_non_positive_sample_rate() {
        FeaturePipeline::new(0.0, FRAME_LEN, PipelineConfig::default());
    }

    #[test]
    #[should_panic(expected = "expected magnitude frame of length")]
    fn rejects_wrong_length_frames() {
        let mut pipeline = FeaturePipeline::new(SAMPLE_RATE, FRAME_LEN, PipelineConfig::default());
        pipeline.process(&vec![0.0; FRAME_LEN / 2]);
    }

    #[test]
    fn single_bin_scenario() {
        // Frame length 1024 at 44.1 kHz, all magnitudes 0 except bin 200
        // (~4307 Hz): loudness saturates and exactly one pitch class is
        // emitted at full scale.
        let mut pipeline = FeaturePipeline::new(SAMPLE_RATE, FRAME_LEN, PipelineConfig::default());
        let mut frame = vec![0.0; FRAME_LEN];
        frame[200] = 1.0;

        let features = pipeline.process(&frame);
        assert_eq!(features.loudness, 1.0);
        assert_eq!(features.chroma.iter().filter(|&&e| e == 1.0).count(), 1);
        assert_eq!(features.chroma.iter().filter(|&&e| e == 0.0).count(), 11);
    }

    #[test]
    fn silent_frames_decay_the_vector() {
        let mut pipeline = FeaturePipeline::new(SAMPLE_RATE, FRAME_LEN, PipelineConfig::default());
        let mut frame = vec![0.0; FRAME_LEN];
        frame[20] = 1.0;
        let active = pipeline.process(&frame);
        let lit = active
            .chroma
            .iter()
            .position(|&e| e == 1.0)
            .expect("active frame must light a class");

        let silence = vec![0.0; FRAME_LEN];
        let first = pipeline.process(&silence);
        let second = pipeline.process(&silence);
        assert!((first.chroma[lit] - 0.8).abs() < 1e-6);
        assert!((second.chroma[lit] - 0.64).abs() < 1e-6);
        assert_eq!(first.loudness, 0.0);
    }

    #[test]
    fn sensitivity_update_applies_to_the_next_frame() {
        let mut pipeline = FeaturePipeline::new(SAMPLE_RATE, FRAME_LEN, PipelineConfig::default());
        let mut frame = vec![0.0; FRAME_LEN];
        frame[20] = 0.05;

        // 0.05 * 5.0 = 0.25: above the gate.
        let features = pipeline.process(&frame);
        assert!((features.loudness - 0.25).abs() < 1e-6);

        // 0.05 * 1.0 = 0.05: at the lower gain the same frame is gated
        // and the previous vector decays instead.
        pipeline.set_sensitivity(1.0);
        let features = pipeline.process(&frame);
        assert!((features.loudness - 0.05).abs() < 1e-6);
        assert!((features.chroma[9] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn reset_zeroes_the_carried_vector() {
        let mut pipeline = FeaturePipeline::new(SAMPLE_RATE, FRAME_LEN, PipelineConfig::default());
        let mut frame = vec![0.0; FRAME_LEN];
        frame[20] = 1.0;
        pipeline.process(&frame);

        pipeline.reset();
        let features = pipeline.process(&vec![0.0; FRAME_LEN]);
        assert_eq!(features.chroma, [0.0; PITCH_CLASSES]);
    }
}
