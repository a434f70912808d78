use crate::position::Position;

/// Video frame rate as a rational number, e.g. 30000/1001.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRate {
    pub num: u32,
    pub den: u32,
}

impl FrameRate {
    pub const fn new(num: u32, den: u32) -> Self {
        Self { num, den }
    }

    pub fn fps(&self) -> f64 {
        if self.den == 0 {
            return 0.0;
        }
        f64::from(self.num) / f64::from(self.den)
    }

    /// Index of the first audio sample belonging to the frame at `position`.
    pub fn sample_offset(&self, position: Position, frequency: u32) -> i64 {
        let fps = self.fps();
        if fps <= 0.0 || frequency == 0 {
            return 0;
        }
        (position as f64 * f64::from(frequency) / fps).round() as i64
    }

    /// Number of audio samples that accompany the frame at `position`.
    ///
    /// Rates that don't divide evenly (44100 Hz at 30000/1001) alternate frame
    /// sizes so the running total never drifts.
    pub fn frame_samples(&self, position: Position, frequency: u32) -> usize {
        let this = self.sample_offset(position, frequency);
        let next = self.sample_offset(position + 1, frequency);
        (next - this).max(0) as usize
    }

    /// Number of frames needed to cover `samples` audio samples.
    pub fn frames_for_samples(&self, samples: usize, frequency: u32) -> Position {
        if frequency == 0 {
            return 0;
        }
        (samples as f64 * self.fps() / f64::from(frequency)).ceil() as Position
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::new(25, 1)
    }
}
