use std::{io::Read, path::Path};

use hound::WavReader;
use log::debug;
use transport::{
    position::{Playhead, Position},
    rate::FrameRate,
};

use crate::{
    audio::AudioBuffer,
    error::ProducerError,
    factory::Factory,
    frame::Frame,
    producer::{FrameSource, ProducerId},
    profile::Profile,
};

/// `WavProducer` serves an in-memory PCM buffer loaded from a `.wav` file,
/// one video frame's worth of audio at a time.
///
/// Supports:
/// - Any channel count (kept interleaved)
/// - 8/16/24/32-bit integer or 32-bit float samples (converted to `f32`)
///
/// Frames requested past the end of the file are placeholders without audio.
///
/// # Example
/// ```no_run
/// use frame_engine::{producer::wav::WavProducer, profile::Profile};
///
/// let producer = WavProducer::from_file("assets/wav/piano.wav", &Profile::default()).unwrap();
/// ```
#[derive(Debug)]
pub struct WavProducer {
    id: ProducerId,
    /// file name
    name: String,
    /// Interleaved samples
    samples: Vec<f32>,
    channels: usize,
    frequency: u32,
    frame_rate: FrameRate,
    playhead: Playhead,
    closed: bool,
}

impl WavProducer {
    fn from_reader<R: Read>(
        reader: WavReader<R>,
        name: &str,
        profile: &Profile,
    ) -> Result<Self, ProducerError> {
        let spec = reader.spec();
        if spec.channels == 0 {
            return Err(ProducerError::Load {
                resource: name.to_owned(),
                message: "WAV declares no channels".to_owned(),
            });
        }

        let samples = Self::decode_pcm_samples(reader).map_err(|e| ProducerError::Load {
            resource: name.to_owned(),
            message: e.to_string(),
        })?;

        Ok(Self::from_samples(
            name,
            samples,
            usize::from(spec.channels),
            spec.sample_rate,
            profile.frame_rate,
        ))
    }

    pub fn from_file<P: AsRef<Path>>(path: P, profile: &Profile) -> Result<Self, ProducerError> {
        let path = path.as_ref();
        let name = path.file_name().map_or_else(
            || path.display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        );
        let reader = WavReader::open(path).map_err(|e| ProducerError::Load {
            resource: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_reader(reader, &name, profile)
    }

    pub fn from_stream<R: Read>(stream: R, profile: &Profile) -> Result<Self, ProducerError> {
        let reader = WavReader::new(stream).map_err(|e| ProducerError::Load {
            resource: "stream".to_owned(),
            message: e.to_string(),
        })?;
        Self::from_reader(reader, "stream", profile)
    }

    /// Builds a producer over already decoded interleaved samples.
    pub fn from_samples(
        name: &str,
        samples: Vec<f32>,
        channels: usize,
        frequency: u32,
        frame_rate: FrameRate,
    ) -> Self {
        let channels = channels.max(1);
        let sample_frames = samples.len() / channels;
        let length = frame_rate.frames_for_samples(sample_frames, frequency);
        debug!(
            "Loaded '{name}': {sample_frames} samples x {channels} channel(s) at {frequency} Hz, {length} frames"
        );

        Self {
            id: ProducerId::new(),
            name: name.to_owned(),
            samples,
            channels,
            frequency,
            frame_rate,
            playhead: Playhead::new(Some(length)),
            closed: false,
        }
    }

    /// Factory entry point: `resource` is a file path.
    pub fn create(
        _factory: &Factory,
        profile: &Profile,
        resource: &str,
    ) -> Result<Box<dyn FrameSource>, ProducerError> {
        Ok(Box::new(Self::from_file(resource, profile)?))
    }

    fn decode_pcm_samples<R: Read>(reader: WavReader<R>) -> Result<Vec<f32>, hound::Error> {
        let spec = reader.spec();
        match spec.sample_format {
            hound::SampleFormat::Int => {
                let scale = (1_i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|s| s as f32 / scale))
                    .collect()
            }
            hound::SampleFormat::Float => reader.into_samples::<f32>().collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn length(&self) -> Position {
        self.playhead.length().unwrap_or(0)
    }

    fn frame_audio(&self, position: Position) -> Option<AudioBuffer> {
        if self.playhead.is_past_end() {
            return None;
        }

        let total = self.samples.len() / self.channels;
        let start = usize::try_from(self.frame_rate.sample_offset(position, self.frequency))
            .ok()?
            .min(total);
        let count = self.frame_rate.frame_samples(position, self.frequency);
        let end = (start + count).min(total);
        if start == end {
            return None;
        }

        let data = self.samples[start * self.channels..end * self.channels].to_vec();
        AudioBuffer::interleaved_f32(data, self.frequency, self.channels).ok()
    }
}

impl FrameSource for WavProducer {
    fn id(&self) -> ProducerId {
        self.id.clone()
    }

    fn get_frame(&mut self, _index: usize) -> Result<Frame, ProducerError> {
        if self.closed {
            return Err(ProducerError::Closed);
        }

        let position = self.playhead.position();
        let frame = match self.frame_audio(position) {
            Some(audio) => Frame::with_audio(position, audio),
            None => Frame::placeholder(position),
        };
        self.playhead.advance();
        Ok(frame)
    }

    fn seek(&mut self, position: Position) -> Result<(), ProducerError> {
        if self.closed {
            return Err(ProducerError::Closed);
        }
        self.playhead.seek(position);
        Ok(())
    }

    fn position(&self) -> Position {
        self.playhead.position()
    }

    fn set_position(&mut self, position: Position) {
        self.playhead.set_position(position);
    }

    fn set_speed(&mut self, speed: f64) {
        self.playhead.set_speed(speed);
    }

    fn close(&mut self) {
        if !self.closed {
            self.samples = Vec::new();
            self.closed = true;
            debug!("Closed '{}'", self.name);
        }
    }
}
