use clap::Parser;
use std::path::PathBuf;

/// Sensitivity range offered by this front-end. The core only requires
/// a positive value; the clamp is a UX choice.
pub const SENSITIVITY_RANGE: (f32, f32) = (1.0, 20.0);

#[derive(Parser, Debug)]
#[command(
    name = "chroma-cli",
    about = "Live microphone loudness and pitch-class meter"
)]
pub struct Cli {
    /// Gain applied to loudness and chroma normalization (1.0-20.0)
    #[arg(short, long, default_value_t = 5.0)]
    pub sensitivity: f32,

    /// Reference chroma sequence to validate against the live output
    /// shape (JSON array of 12-element arrays)
    #[arg(short, long)]
    pub reference: Option<PathBuf>,

    /// Stop after this many frames (runs until the stream ends when omitted)
    #[arg(long)]
    pub frames: Option<usize>,
}
