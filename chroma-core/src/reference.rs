//! Loading of precomputed reference chroma sequences.
//!
//! A reference file is a JSON array of 12-element numeric arrays, one
//! chroma vector per frame of the reference performance. This crate
//! only loads and validates the sequence; comparing live frames against
//! it belongs to a future matcher.

use crate::chroma::PITCH_CLASSES;
use anyhow::{Context, Result, bail};
use std::fs;
use std::path::Path;

/// A validated reference performance: ordered chroma vectors in the
/// same shape and range the live pipeline emits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceSequence {
    frames: Vec<[f32; PITCH_CLASSES]>,
}

impl ReferenceSequence {
    /// Loads and validates a reference file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read reference file {}", path.display()))?;
        let rows: Vec<Vec<f32>> = serde_json::from_str(&data)
            .with_context(|| format!("{} is not an array of chroma vectors", path.display()))?;
        Self::from_rows(rows)
            .with_context(|| format!("invalid reference data in {}", path.display()))
    }

    /// Validates raw nested arrays into a sequence.
    ///
    /// Every row must hold exactly 12 finite values in [0, 1]; anything
    /// else is a malformed file, reported with the offending frame.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
        let mut frames = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            if row.len() != PITCH_CLASSES {
                bail!(
                    "frame {index}: expected {PITCH_CLASSES} pitch classes, got {}",
                    row.len()
                );
            }
            for (class, &value) in row.iter().enumerate() {
                if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                    bail!("frame {index}, class {class}: value {value} outside [0, 1]");
                }
            }
            let mut frame = [0.0; PITCH_CLASSES];
            frame.copy_from_slice(row);
            frames.push(frame);
        }
        Ok(Self { frames })
    }

    pub fn frames(&self) -> &[[f32; PITCH_CLASSES]] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
