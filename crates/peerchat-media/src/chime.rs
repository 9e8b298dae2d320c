/// Short notification tone synthesis.
///
/// The tone is a single sine partial shaped by a linear attack/release
/// envelope so it starts and ends at zero and never clicks.

#[derive(Debug, Clone)]
pub struct ChimeConfig {
    pub sample_rate: u32,
    pub frequency_hz: f32,
    pub duration_ms: u32,
    /// Peak amplitude in `[0.0, 1.0]`.
    pub volume: f32,
    /// Attack and release length, each.
    pub ramp_ms: u32,
}

impl Default for ChimeConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            frequency_hz: 880.0,
            duration_ms: 150,
            volume: 0.3,
            ramp_ms: 15,
        }
    }
}

impl ChimeConfig {
    pub fn sample_count(&self) -> usize {
        (self.sample_rate as usize * self.duration_ms as usize) / 1000
    }
}

/// Render the tone as mono `f32` samples.
pub fn synthesize_chime(config: &ChimeConfig) -> Vec<f32> {
    let total = config.sample_count();
    let ramp = ((config.sample_rate as usize * config.ramp_ms as usize) / 1000)
        .clamp(1, (total / 2).max(1));
    let volume = config.volume.clamp(0.0, 1.0);
    let step = std::f32::consts::TAU * config.frequency_hz / config.sample_rate as f32;

    (0..total)
        .map(|i| {
            let envelope = if i < ramp {
                i as f32 / ramp as f32
            } else if i >= total - ramp {
                (total - 1 - i) as f32 / ramp as f32
            } else {
                1.0
            };
            (step * i as f32).sin() * volume * envelope
        })
        .collect()
}
