use std::f64::consts::PI;

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

pub const DEFAULT_TONE_FREQUENCY: f64 = 440.0;

/// Endless sine tone, identical on every channel.
///
/// The phase is derived from the absolute sample offset of each frame, so the
/// tone stays continuous across seeks and restricted positions.
#[derive(Debug, Clone)]
pub struct ToneProducer {
    id: ProducerId,
    freq: f64,
    sample_rate: u32,
    channels: usize,
    frame_rate: FrameRate,
    playhead: Playhead,
}

impl ToneProducer {
    pub fn new(freq: f64, profile: &Profile) -> Self {
        Self {
            id: ProducerId::new(),
            freq,
            sample_rate: profile.frequency,
            channels: profile.channels.max(1),
            frame_rate: profile.frame_rate,
            playhead: Playhead::unbounded(),
        }
    }

    /// Factory entry point: `resource` is the tone frequency in Hz, or empty for 440 Hz.
    pub fn create(
        _factory: &Factory,
        profile: &Profile,
        resource: &str,
    ) -> Result<Box<dyn FrameSource>, ProducerError> {
        let freq = match resource.trim() {
            "" => DEFAULT_TONE_FREQUENCY,
            value => value
                .parse()
                .map_err(|_| ProducerError::UnsupportedResource(resource.to_owned()))?,
        };
        Ok(Box::new(Self::new(freq, profile)))
    }

    fn render(&self, position: Position) -> Option<AudioBuffer> {
        let offset = self.frame_rate.sample_offset(position, self.sample_rate);
        let count = self.frame_rate.frame_samples(position, self.sample_rate);
        let phase_increment = 2.0 * PI * self.freq / f64::from(self.sample_rate);

        let mut data = Vec::with_capacity(count * self.channels);
        for i in 0..count {
            let sample = ((offset + i as i64) as f64 * phase_increment).sin() as f32;
            data.extend(std::iter::repeat_n(sample, self.channels));
        }
        AudioBuffer::interleaved_f32(data, self.sample_rate, self.channels).ok()
    }
}

impl FrameSource for ToneProducer {
    fn id(&self) -> ProducerId {
        self.id.clone()
    }

    fn get_frame(&mut self, _index: usize) -> Result<Frame, ProducerError> {
        let position = self.playhead.position();
        let frame = match self.render(position) {
            Some(audio) if audio.samples() > 0 => Frame::with_audio(position, audio),
            _ => Frame::placeholder(position),
        };
        self.playhead.advance();
        Ok(frame)
    }

    fn seek(&mut self, position: Position) -> Result<(), ProducerError> {
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
}
