//! # Feature Worker Module
//!
//! Owns the capture session on a dedicated thread: raw sample frames
//! come in from the CPAL callback, get transformed to magnitude spectra
//! and reduced to [`FrameFeatures`], which are pushed to the consumer
//! channel. All pipeline state lives on this one thread, so frames are
//! processed strictly in arrival order and consumers only ever see
//! complete feature snapshots.

use crate::FrameFeatures;
use crate::audio;
use crate::config::PipelineConfig;
use crate::pipeline::FeaturePipeline;
use crate::spectrum::SpectrumAnalyzer;
use crossbeam_channel::{Receiver, Sender, select};
use std::thread::{self, JoinHandle};

/// Runtime adjustments accepted by a running worker.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlMessage {
    /// Replace the sensitivity gain, effective from the next frame.
    SetSensitivity(f32),
}

/// Handle to a running capture-and-analysis thread.
///
/// Dropping the handle without calling [`FeatureWorker::stop`] leaves
/// the thread to wind down on its own once its channels disconnect.
#[derive(Debug)]
pub struct FeatureWorker {
    control_tx: Sender<ControlMessage>,
    shutdown_tx: Sender<()>,
    thread_handle: Option<JoinHandle<()>>,
}

impl FeatureWorker {
    /// Requests a new sensitivity gain. Non-positive values are
    /// rejected by the worker thread with a warning rather than applied.
    pub fn set_sensitivity(&self, sensitivity: f32) {
        let _ = self
            .control_tx
            .send(ControlMessage::SetSensitivity(sensitivity));
    }

    /// Signals the worker to stop and waits for the thread to finish.
    /// The pipeline state is cleared before the thread exits, so a
    /// later session starts from silence.
    pub fn stop(mut self) {
        let _ = self.shutdown_tx.send(());
        if let Some(handle) = self.thread_handle.take() {
            if handle.join().is_err() {
                log::warn!("Feature worker thread panicked during shutdown");
            }
        }
    }
}

/// Spawns the capture session.
///
/// Returns the worker handle and the consumer end of the feature
/// channel. Capture setup happens on the worker thread (CPAL streams
/// are not `Send`); if it fails, the error is logged and the feature
/// channel simply closes.
pub fn spawn_feature_worker(
    config: PipelineConfig,
) -> (FeatureWorker, Receiver<FrameFeatures>) {
    let (features_tx, features_rx) = crossbeam_channel::unbounded();
    let (control_tx, control_rx) = crossbeam_channel::unbounded();
    let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded(1);

    let thread_handle = thread::spawn(move || {
        let (raw_tx, raw_rx) = crossbeam_channel::unbounded::<Vec<f32>>();

        let (stream, sample_rate) = match audio::start_capture(raw_tx) {
            Ok(session) => session,
            Err(e) => {
                log::error!("Failed to start audio capture: {e:#}");
                return;
            }
        };

        let mut analyzer = SpectrumAnalyzer::new(audio::BUFFER_SIZE);
        let mut pipeline =
            FeaturePipeline::new(sample_rate as f32, analyzer.spectrum_len(), config);

        log::debug!(
            "Feature worker running: {} samples per frame at {sample_rate} Hz",
            audio::BUFFER_SIZE
        );

        loop {
            select! {
                recv(raw_rx) -> msg => match msg {
                    Ok(samples) => {
                        let magnitudes = analyzer.magnitudes(&samples);
                        let features = pipeline.process(&magnitudes);
                        if features_tx.send(features).is_err() {
                            log::debug!("Feature consumer disconnected");
                            break;
                        }
                    }
                    Err(_) => {
                        log::warn!("Audio capture channel closed");
                        break;
                    }
                },
                recv(control_rx) -> msg => match msg {
                    Ok(ControlMessage::SetSensitivity(sensitivity)) => {
                        if sensitivity > 0.0 {
                            pipeline.set_sensitivity(sensitivity);
                            log::debug!("Sensitivity set to {sensitivity}");
                        } else {
                            log::warn!("Ignoring non-positive sensitivity {sensitivity}");
                        }
                    }
                    // Handle dropped without stop(); wind down.
                    Err(_) => break,
                },
                recv(shutdown_rx) -> _ => break,
            }
        }

        // A restarted session must not inherit this one's chroma state.
        pipeline.reset();

        if let Err(e) = stream.pause() {
            log::warn!("Error pausing capture stream: {e}");
        }
        drop(stream);
        log::debug!("Feature worker finished");
    });

    let worker = FeatureWorker {
        control_tx,
        shutdown_tx,
        thread_handle: Some(thread_handle),
    };
    (worker, features_rx)
}
