//! Integration tests for the full sample-to-feature path.

use chroma_core::chroma::{PITCH_CLASSES, pitch_class_for_frequency};
use chroma_core::config::PipelineConfig;
use chroma_core::pipeline::FeaturePipeline;
use chroma_core::spectrum::SpectrumAnalyzer;

const SAMPLE_RATE: f32 = 44_100.0;
const BUFFER_LEN: usize = 2048;

/// Synthesizes one analysis buffer containing the given sine tones.
fn tone_buffer(tones: &[(f32, f32)]) -> Vec<f32> {
    (0..BUFFER_LEN)
        .map(|i| {
            tones
                .iter()
                .map(|&(frequency, amplitude)| {
                    amplitude
                        * (2.0 * std::f32::consts::PI * frequency * i as f32 / SAMPLE_RATE).sin()
                })
                .sum()
        })
        .collect()
}

#[test]
fn a440_tone_lights_pitch_class_a() {
    let mut analyzer = SpectrumAnalyzer::new(BUFFER_LEN);
    let mut pipeline =
        FeaturePipeline::new(SAMPLE_RATE, analyzer.spectrum_len(), PipelineConfig::default());

    let magnitudes = analyzer.magnitudes(&tone_buffer(&[(440.0, 0.8)]));
    let features = pipeline.process(&magnitudes);

    assert!(features.loudness > 0.5);
    let dominant = features
        .chroma
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
        .map(|(class, _)| class)
        .unwrap();
    assert_eq!(dominant, 9, "expected pitch class A to dominate");
    assert_eq!(features.chroma[9], 1.0);
}

#[test]
fn octave_doubling_keeps_the_same_class() {
    for frequency in [220.0, 440.0, 880.0] {
        let mut analyzer = SpectrumAnalyzer::new(BUFFER_LEN);
        let mut pipeline = FeaturePipeline::new(
            SAMPLE_RATE,
            analyzer.spectrum_len(),
            PipelineConfig::default(),
        );

        let magnitudes = analyzer.magnitudes(&tone_buffer(&[(frequency, 0.8)]));
        let features = pipeline.process(&magnitudes);

        let dominant = features
            .chroma
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(class, _)| class)
            .unwrap();
        assert_eq!(dominant, 9, "{frequency} Hz should land on pitch class A");
    }
}

#[test]
fn features_stay_in_range_across_a_session() {
    let mut analyzer = SpectrumAnalyzer::new(BUFFER_LEN);
    let mut pipeline =
        FeaturePipeline::new(SAMPLE_RATE, analyzer.spectrum_len(), PipelineConfig::default());

    let buffers = [
        tone_buffer(&[(261.63, 0.9), (329.63, 0.4), (392.0, 0.4)]), // C major
        tone_buffer(&[(440.0, 0.05)]),                              // quiet
        vec![0.0; BUFFER_LEN],                                      // silence
        tone_buffer(&[(1760.0, 1.0)]),
    ];

    for buffer in &buffers {
        let features = pipeline.process(&analyzer.magnitudes(buffer));
        assert!((0.0..=1.0).contains(&features.loudness));
        assert_eq!(features.chroma.len(), PITCH_CLASSES);
        for &energy in &features.chroma {
            assert!((0.0..=1.0).contains(&energy));
        }
    }
}

#[test]
fn silence_after_a_chord_fades_instead_of_cutting() {
    let mut analyzer = SpectrumAnalyzer::new(BUFFER_LEN);
    let mut pipeline =
        FeaturePipeline::new(SAMPLE_RATE, analyzer.spectrum_len(), PipelineConfig::default());

    let chord = analyzer.magnitudes(&tone_buffer(&[(261.63, 0.9), (392.0, 0.7)]));
    let active = pipeline.process(&chord);
    let lit = pitch_class_for_frequency(261.63).unwrap();
    assert!(active.chroma[lit] > 0.0);

    let silence = analyzer.magnitudes(&vec![0.0; BUFFER_LEN]);
    let mut previous = active.chroma[lit];
    for _ in 0..5 {
        let features = pipeline.process(&silence);
        assert!(features.chroma[lit] < previous);
        assert!(features.chroma[lit] > 0.0);
        previous = features.chroma[lit];
    }
}

#[test]
fn live_output_is_comparable_to_reference_frames() {
    use chroma_core::reference::ReferenceSequence;

    let mut analyzer = SpectrumAnalyzer::new(BUFFER_LEN);
    let mut pipeline =
        FeaturePipeline::new(SAMPLE_RATE, analyzer.spectrum_len(), PipelineConfig::default());

    let features = pipeline.process(&analyzer.magnitudes(&tone_buffer(&[(440.0, 0.8)])));

    // A live vector is itself a valid reference row: same shape, same range.
    let sequence = ReferenceSequence::from_rows(vec![features.chroma.to_vec()]).unwrap();
    assert_eq!(sequence.frames()[0], features.chroma);
}
