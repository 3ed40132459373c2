//! # Audio Capture Module
//!
//! Real-time microphone capture via CPAL. Samples arrive in
//! device-sized callbacks, are regrouped into fixed [`BUFFER_SIZE`]
//! frames and handed to the analysis thread over a channel. The
//! callback never blocks: if the analysis side falls behind, frames are
//! dropped rather than stalling the device.

use anyhow::{Result, anyhow};
use cpal::SupportedStreamConfigRange;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::Sender;

/// Number of samples per analysis frame.
///
/// 2048 samples at 44.1 kHz is ~46 ms per frame, giving 1024 spectrum
/// bins of ~21.5 Hz each. Larger frames sharpen the frequency
/// resolution but make the pitch-class display lag the performer.
pub const BUFFER_SIZE: usize = 2048;

/// Target sample rate in Hz. Devices that cannot do 44.1 kHz get the
/// nearest supported rate; the actual rate is returned to the caller.
const TARGET_SAMPLE_RATE: u32 = 44_100;

/// Starts capture from the default input device.
///
/// Mono f32 input is preferred; if the device only offers multi-channel
/// configurations the channels are averaged down to mono before
/// framing. Full frames are pushed through `sender` with `try_send`.
///
/// Returns the live stream handle (capture stops when it is dropped)
/// and the negotiated sample rate.
pub fn start_capture(sender: Sender<Vec<f32>>) -> Result<(cpal::Stream, u32)> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| anyhow!("No input device available"))?;

    log::info!("Using audio input device: {}", device.name()?);

    let configs = device.supported_input_configs()?.collect::<Vec<_>>();
    let supported_config = pick_input_config(configs, TARGET_SAMPLE_RATE)
        .ok_or_else(|| anyhow!("No suitable f32 input format found"))?;

    let config = clamp_sample_rate(supported_config, TARGET_SAMPLE_RATE);
    let sample_rate = config.sample_rate().0;
    let channels = config.channels() as usize;
    let config: cpal::StreamConfig = config.into();

    log::info!("Selected sample rate: {sample_rate} Hz ({channels} channel(s))");

    let err_fn = |err| log::error!("Audio stream error: {err}");

    // Accumulates callback data until a full frame is available.
    let mut pending = Vec::with_capacity(BUFFER_SIZE * 2);

    let stream = device.build_input_stream(
        &config,
        move |data: &[f32], _: &cpal::InputCallbackInfo| {
            if channels == 1 {
                pending.extend_from_slice(data);
            } else {
                pending.extend(
                    data.chunks_exact(channels)
                        .map(|frame| frame.iter().sum::<f32>() / channels as f32),
                );
            }

            while pending.len() >= BUFFER_SIZE {
                let frame = pending[..BUFFER_SIZE].to_vec();
                // Dropped frames are acceptable; a stalled device is not.
                let _ = sender.try_send(frame);
                pending.drain(..BUFFER_SIZE);
            }
        },
        err_fn,
        None,
    )?;

    stream.play()?;

    Ok((stream, sample_rate))
}

/// Picks the input configuration closest to the target sample rate,
/// preferring mono f32 and falling back to any f32 channel count.
fn pick_input_config(
    configs: Vec<SupportedStreamConfigRange>,
    target_rate: u32,
) -> Option<SupportedStreamConfigRange> {
    let f32_configs: Vec<_> = configs
        .into_iter()
        .filter(|c| c.sample_format() == cpal::SampleFormat::F32)
        .collect();

    let rate_distance = |c: &SupportedStreamConfigRange| {
        let min_diff = (c.min_sample_rate().0 as i32 - target_rate as i32).abs();
        let max_diff = (c.max_sample_rate().0 as i32 - target_rate as i32).abs();
        min_diff.min(max_diff)
    };

    f32_configs
        .iter()
        .filter(|c| c.channels() == 1)
        .min_by_key(|c| rate_distance(c))
        .or_else(|| f32_configs.iter().min_by_key(|c| rate_distance(c)))
        .cloned()
}

/// Resolves a config range to a concrete config as close to the target
/// rate as the range allows.
fn clamp_sample_rate(
    range: SupportedStreamConfigRange,
    target_rate: u32,
) -> cpal::SupportedStreamConfig {
    let rate = target_rate
        .max(range.min_sample_rate().0)
        .min(range.max_sample_rate().0);
    range.with_sample_rate(cpal::SampleRate(rate))
}
