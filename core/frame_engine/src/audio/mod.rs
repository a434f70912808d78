use crate::{
    audio::format::{AudioFormat, Layout},
    error::AudioError,
};

pub mod format;
pub mod resample;

/// Raw sample storage. The variant must agree with the buffer's [`AudioFormat`].
#[derive(Debug, Clone, PartialEq)]
pub enum SampleData {
    U8(Vec<u8>),
    I16(Vec<i16>),
    I32(Vec<i32>),
    F32(Vec<f32>),
}

impl SampleData {
    pub fn len(&self) -> usize {
        match self {
            Self::U8(d) => d.len(),
            Self::I16(d) => d.len(),
            Self::I32(d) => d.len(),
            Self::F32(d) => d.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn matches(&self, format: AudioFormat) -> bool {
        matches!(
            (self, format),
            (Self::U8(_), AudioFormat::U8)
                | (Self::I16(_), AudioFormat::S16)
                | (Self::I32(_), AudioFormat::S32 | AudioFormat::S32Le)
                | (Self::F32(_), AudioFormat::Float | AudioFormat::F32Le)
        )
    }

    fn silence(format: AudioFormat, len: usize) -> Self {
        match format {
            AudioFormat::U8 => Self::U8(vec![128; len]),
            AudioFormat::S16 => Self::I16(vec![0; len]),
            AudioFormat::S32 | AudioFormat::S32Le => Self::I32(vec![0; len]),
            AudioFormat::Float | AudioFormat::F32Le => Self::F32(vec![0.0; len]),
        }
    }

    fn normalized(&self, index: usize) -> f32 {
        match self {
            Self::U8(d) => (f32::from(d[index]) - 128.0) / 128.0,
            Self::I16(d) => f32::from(d[index]) / 32768.0,
            Self::I32(d) => (f64::from(d[index]) / 2_147_483_648.0) as f32,
            Self::F32(d) => d[index],
        }
    }
}

/// Audio attached to one frame: `samples` sample frames of `channels` channels each.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    data: SampleData,
    format: AudioFormat,
    frequency: u32,
    channels: usize,
    samples: usize,
}

impl AudioBuffer {
    pub fn new(
        data: SampleData,
        format: AudioFormat,
        frequency: u32,
        channels: usize,
        samples: usize,
    ) -> Result<Self, AudioError> {
        if !data.matches(format) {
            return Err(AudioError::FormatMismatch(format));
        }
        if channels == 0 {
            return Err(AudioError::InvalidRequest {
                frequency,
                channels,
            });
        }
        let expected = samples * channels;
        if data.len() != expected {
            return Err(AudioError::LengthMismatch {
                expected,
                actual: data.len(),
                channels,
            });
        }

        Ok(Self {
            data,
            format,
            frequency,
            channels,
            samples,
        })
    }

    /// Wraps interleaved `f32` samples as an [`AudioFormat::F32Le`] buffer.
    pub fn interleaved_f32(
        data: Vec<f32>,
        frequency: u32,
        channels: usize,
    ) -> Result<Self, AudioError> {
        let samples = data.len().checked_div(channels).unwrap_or(0);
        Self::new(
            SampleData::F32(data),
            AudioFormat::F32Le,
            frequency,
            channels,
            samples,
        )
    }

    pub fn silence(format: AudioFormat, frequency: u32, channels: usize, samples: usize) -> Self {
        Self {
            data: SampleData::silence(format, samples * channels),
            format,
            frequency,
            channels,
            samples,
        }
    }

    pub fn data(&self) -> &SampleData {
        &self.data
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    pub fn frequency(&self) -> u32 {
        self.frequency
    }

    pub fn set_frequency(&mut self, frequency: u32) {
        self.frequency = frequency;
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Reverses the temporal order of sample frames in place.
    ///
    /// Each sample frame moves as a unit, so channel `n` of a frame stays
    /// channel `n` after the reversal.
    pub fn reverse_sample_order(&mut self) {
        let (layout, channels, samples) = (self.format.layout(), self.channels, self.samples);
        match &mut self.data {
            SampleData::U8(d) => reverse_frames(d, layout, channels, samples),
            SampleData::I16(d) => reverse_frames(d, layout, channels, samples),
            SampleData::I32(d) => reverse_frames(d, layout, channels, samples),
            SampleData::F32(d) => reverse_frames(d, layout, channels, samples),
        }
    }

    /// Normalized value of one channel of one sample frame.
    pub fn sample(&self, frame: usize, channel: usize) -> f32 {
        let index = match self.format.layout() {
            Layout::Interleaved => frame * self.channels + channel,
            Layout::Planar => channel * self.samples + frame,
        };
        self.data.normalized(index)
    }

    /// Converts to `(L, R)` pairs. Mono is duplicated, extra channels are dropped.
    pub fn to_stereo(&self) -> Vec<(f32, f32)> {
        (0..self.samples)
            .map(|frame| {
                let left = self.sample(frame, 0);
                let right = if self.channels > 1 {
                    self.sample(frame, 1)
                } else {
                    left
                };
                (left, right)
            })
            .collect()
    }
}

fn reverse_frames<T>(data: &mut [T], layout: Layout, channels: usize, samples: usize) {
    if channels == 0 || samples < 2 {
        return;
    }

    match layout {
        Layout::Interleaved => {
            // Reversing everything flips channel order inside each frame; undo that per frame.
            data.reverse();
            for frame in data.chunks_exact_mut(channels) {
                frame.reverse();
            }
        }
        Layout::Planar => {
            for plane in data.chunks_exact_mut(samples) {
                plane.reverse();
            }
        }
    }
}
