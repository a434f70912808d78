use transport::rate::FrameRate;

use crate::constants::{DEFAULT_CHANNELS, DEFAULT_FREQUENCY};

/// Timing and audio shape shared by every producer built for one timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub description: String,
    pub frame_rate: FrameRate,
    /// Audio frequency used by generated audio and as the default request
    pub frequency: u32,
    pub channels: usize,
}

impl Profile {
    pub fn new(
        description: impl Into<String>,
        frame_rate: FrameRate,
        frequency: u32,
        channels: usize,
    ) -> Self {
        Self {
            description: description.into(),
            frame_rate,
            frequency,
            channels,
        }
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::new(
            "25 fps stereo",
            FrameRate::default(),
            DEFAULT_FREQUENCY,
            DEFAULT_CHANNELS,
        )
    }
}
