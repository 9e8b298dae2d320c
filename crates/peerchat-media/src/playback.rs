//! Rendering a synthesized chime.

use crate::chime::ChimeConfig;
use crate::error::AudioError;

/// Something that can render mono samples. Implementations block until the
/// samples have been handed to the device, so async callers should run them
/// on a blocking thread.
pub trait ChimePlayer: Send + Sync {
    fn play(&self, samples: &[f32], config: &ChimeConfig) -> Result<(), AudioError>;
}

/// The player for this build: the default output device when compiled with
/// the `playback` feature, otherwise one that always reports
/// [`AudioError::PlaybackUnavailable`].
pub fn default_player() -> Box<dyn ChimePlayer> {
    #[cfg(feature = "playback")]
    {
        Box::new(device::DevicePlayer)
    }
    #[cfg(not(feature = "playback"))]
    {
        Box::new(UnavailablePlayer)
    }
}

#[cfg(not(feature = "playback"))]
struct UnavailablePlayer;

#[cfg(not(feature = "playback"))]
impl ChimePlayer for UnavailablePlayer {
    fn play(&self, samples: &[f32], _config: &ChimeConfig) -> Result<(), AudioError> {
        tracing::debug!(samples = samples.len(), "Playback not compiled in");
        Err(AudioError::PlaybackUnavailable)
    }
}

#[cfg(feature = "playback")]
mod device {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
    use tracing::{debug, error, info};

    use super::ChimePlayer;
    use crate::chime::ChimeConfig;
    use crate::error::AudioError;

    /// Plays through the host's default output device.
    pub(super) struct DevicePlayer;

    impl ChimePlayer for DevicePlayer {
        fn play(&self, samples: &[f32], config: &ChimeConfig) -> Result<(), AudioError> {
            let host = cpal::default_host();
            let device = host
                .default_output_device()
                .ok_or(AudioError::NoOutputDevice)?;

            info!(device = ?device.name(), "Using output device");

            let stream_config = cpal::StreamConfig {
                channels: 1,
                sample_rate: cpal::SampleRate(config.sample_rate),
                buffer_size: cpal::BufferSize::Default,
            };

            let buffer: Arc<Mutex<VecDeque<f32>>> =
                Arc::new(Mutex::new(samples.iter().copied().collect()));
            let source = buffer.clone();

            let stream = device
                .build_output_stream(
                    &stream_config,
                    move |data: &mut [f32], _info: &cpal::OutputCallbackInfo| {
                        let Ok(mut pending) = source.lock() else {
                            data.fill(0.0);
                            return;
                        };
                        for sample in data.iter_mut() {
                            *sample = pending.pop_front().unwrap_or(0.0);
                        }
                    },
                    move |err| {
                        error!("Audio output error: {err}");
                    },
                    None,
                )
                .map_err(|e| AudioError::StreamError(e.to_string()))?;

            stream
                .play()
                .map_err(|e| AudioError::StreamError(e.to_string()))?;

            // Tail covers the device buffer still draining after the last sample.
            std::thread::sleep(Duration::from_millis(config.duration_ms as u64 + 50));
            drop(stream);
            debug!("Chime played");
            Ok(())
        }
    }
}
