//! # Chroma CLI - Live Pitch-Class Meter
//!
//! Terminal front-end for the chroma feature extractor. A worker thread
//! owns the capture stream and the reduction pipeline; this thread only
//! receives finished feature frames over a channel and renders them,
//! one line per analysis frame.

mod cli;

use anyhow::{Context, Result, bail};
use chroma_core::FrameFeatures;
use chroma_core::chroma::{PITCH_CLASS_NAMES, PITCH_CLASSES};
use chroma_core::config::PipelineConfig;
use chroma_core::reference::ReferenceSequence;
use chroma_core::worker::spawn_feature_worker;
use clap::Parser;
use cli::{Cli, SENSITIVITY_RANGE};

/// Width of the loudness meter in characters.
const METER_WIDTH: usize = 20;

/// Glyphs for per-class energy, from silent to full scale.
const LEVEL_GLYPHS: [char; 9] = [' ', '\u{2581}', '\u{2582}', '\u{2583}', '\u{2584}', '\u{2585}', '\u{2586}', '\u{2587}', '\u{2588}'];

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Cli::parse();

    if !args.sensitivity.is_finite() || args.sensitivity <= 0.0 {
        bail!("sensitivity must be a positive number, got {}", args.sensitivity);
    }
    let (low, high) = SENSITIVITY_RANGE;
    let sensitivity = args.sensitivity.clamp(low, high);
    if sensitivity != args.sensitivity {
        log::warn!(
            "Sensitivity {} clamped to {sensitivity} (supported range {low}-{high})",
            args.sensitivity
        );
    }

    if let Some(path) = &args.reference {
        let sequence = ReferenceSequence::load(path)
            .with_context(|| format!("could not load reference {}", path.display()))?;
        log::info!(
            "Loaded reference sequence: {} frames from {}",
            sequence.len(),
            path.display()
        );
    }

    let config = PipelineConfig {
        sensitivity,
        ..PipelineConfig::default()
    };

    println!("      loudness              {}", class_header());
    let (worker, features_rx) = spawn_feature_worker(config);

    let mut rendered = 0usize;
    for features in features_rx.iter() {
        println!("{}", render_frame(&features));
        rendered += 1;
        if args.frames.is_some_and(|limit| rendered >= limit) {
            break;
        }
    }

    worker.stop();

    if rendered == 0 {
        bail!("no audio frames received; is an input device available?");
    }
    log::info!("Rendered {rendered} frames");
    Ok(())
}

fn class_header() -> String {
    PITCH_CLASS_NAMES
        .iter()
        .map(|name| format!("{name:>2}"))
        .collect()
}

fn render_frame(features: &FrameFeatures) -> String {
    let filled = (features.loudness * METER_WIDTH as f32).round() as usize;
    let meter: String = (0..METER_WIDTH)
        .map(|i| if i < filled { '=' } else { ' ' })
        .collect();

    let classes: String = features
        .chroma
        .iter()
        .map(|&energy| format!(" {}", level_glyph(energy)))
        .collect();

    let dominant = dominant_class(&features.chroma)
        .map(|class| PITCH_CLASS_NAMES[class])
        .unwrap_or("-");

    format!(
        "{:4.2} [{meter}] {classes}  {dominant}",
        features.loudness
    )
}

fn level_glyph(energy: f32) -> char {
    let step = (energy.clamp(0.0, 1.0) * (LEVEL_GLYPHS.len() - 1) as f32).round() as usize;
    LEVEL_GLYPHS[step]
}

/// The strongest pitch class, or `None` when the vector is silent.
fn dominant_class(chroma: &[f32; PITCH_CLASSES]) -> Option<usize> {
    chroma
        .iter()
        .enumerate()
        .filter(|(_, &energy)| energy > 0.0)
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(class, _)| class)
}
