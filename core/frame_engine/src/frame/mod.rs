use std::fmt;

use transport::position::Position;

use crate::{
    audio::{AudioBuffer, format::AudioFormat},
    error::AudioError,
};

/// What a consumer would like to receive when it pulls audio from a frame.
///
/// Only a proposal: the returned [`AudioBuffer`] reports what was actually produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioRequest {
    pub format: AudioFormat,
    pub frequency: u32,
    pub channels: usize,
    pub samples: usize,
}

impl AudioRequest {
    pub const fn new(format: AudioFormat, frequency: u32, channels: usize, samples: usize) -> Self {
        Self {
            format,
            frequency,
            channels,
            samples,
        }
    }
}

/// A deferred audio stage registered on a frame.
///
/// Runs at most once, when a consumer pulls audio. A step usually calls
/// [`Frame::get_audio`] itself to realize whatever lies beneath it, then
/// transforms the result.
pub trait AudioStep: Send {
    fn get_audio(
        self: Box<Self>,
        frame: &mut Frame,
        request: AudioRequest,
    ) -> Result<AudioBuffer, AudioError>;
}

impl<F> AudioStep for F
where
    F: FnOnce(&mut Frame, AudioRequest) -> Result<AudioBuffer, AudioError> + Send,
{
    fn get_audio(
        self: Box<Self>,
        frame: &mut Frame,
        request: AudioRequest,
    ) -> Result<AudioBuffer, AudioError> {
        (*self)(frame, request)
    }
}

/// One unit of produced media for a position.
pub struct Frame {
    position: Position,
    audio: Option<AudioBuffer>,
    /// Set on frames without real audio; those are exempt from audio processing
    test_audio: bool,
    audio_steps: Vec<Box<dyn AudioStep>>,
}

impl Frame {
    pub fn new(position: Position) -> Self {
        Self {
            position,
            audio: None,
            test_audio: false,
            audio_steps: Vec::new(),
        }
    }

    pub fn with_audio(position: Position, audio: AudioBuffer) -> Self {
        Self {
            audio: Some(audio),
            ..Self::new(position)
        }
    }

    /// A placeholder frame that carries no real audio.
    pub fn placeholder(position: Position) -> Self {
        Self {
            test_audio: true,
            ..Self::new(position)
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub fn is_test_audio(&self) -> bool {
        self.test_audio
    }

    pub fn pending_audio_steps(&self) -> usize {
        self.audio_steps.len()
    }

    /// Registers a step to run when audio is pulled. The last one pushed runs first.
    pub fn push_audio(&mut self, step: Box<dyn AudioStep>) {
        self.audio_steps.push(step);
    }

    /// Realizes this frame's audio, running any pending steps.
    ///
    /// The outcome is cached on the frame, so pulling again returns the same
    /// audio without re-running the steps. Without stored audio, silence
    /// shaped by `request` is produced and the frame is marked as test audio.
    pub fn get_audio(&mut self, request: AudioRequest) -> Result<AudioBuffer, AudioError> {
        let audio = match self.audio_steps.pop() {
            Some(step) => step.get_audio(self, request)?,
            None => self.base_audio(request)?,
        };
        self.audio = Some(audio.clone());
        Ok(audio)
    }

    fn base_audio(&mut self, request: AudioRequest) -> Result<AudioBuffer, AudioError> {
        if let Some(audio) = &self.audio {
            return Ok(audio.clone());
        }

        if request.frequency == 0 || request.channels == 0 {
            return Err(AudioError::InvalidRequest {
                frequency: request.frequency,
                channels: request.channels,
            });
        }

        self.test_audio = true;
        Ok(AudioBuffer::silence(
            request.format,
            request.frequency,
            request.channels,
            request.samples,
        ))
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("position", &self.position)
            .field("audio", &self.audio)
            .field("test_audio", &self.test_audio)
            .field("audio_steps", &self.audio_steps.len())
            .finish()
    }
}
