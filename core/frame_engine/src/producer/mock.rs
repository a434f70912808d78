use std::sync::{Arc, Mutex};

use transport::position::{Playhead, Position};

use crate::{
    audio::{AudioBuffer, format::AudioFormat},
    error::{AudioError, ProducerError},
    frame::{AudioRequest, Frame},
    producer::{FrameSource, ParameterChange, ProducerId},
};

/// Everything a [`MockSource`] was asked to do.
#[derive(Debug, Default)]
pub struct MockLog {
    pub requested_indices: Vec<usize>,
    pub frame_positions: Vec<Position>,
    pub set_positions: Vec<Position>,
    pub seeks: Vec<Position>,
    pub speed: Option<f64>,
    pub param_changes: Vec<ParameterChange>,
    pub closed: usize,
}

/// Source with a fixed audio payload that records its calls.
#[derive(Debug)]
pub struct MockSource {
    id: ProducerId,
    playhead: Playhead,
    /// `None` makes every frame a placeholder
    audio: Option<AudioBuffer>,
    fail_frames: bool,
    /// Pushed as an audio step on every frame, so pulling audio fails with it
    audio_error: Option<AudioError>,
    log: Arc<Mutex<MockLog>>,
}

impl MockSource {
    pub fn with_audio(audio: AudioBuffer) -> Self {
        Self {
            id: "mock-source".into(),
            playhead: Playhead::unbounded(),
            audio: Some(audio),
            fail_frames: false,
            audio_error: None,
            log: Arc::default(),
        }
    }

    pub fn silent() -> Self {
        Self {
            audio: None,
            ..Self::with_audio(AudioBuffer::silence(
                AudioFormat::F32Le,
                48000,
                2,
                0,
            ))
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_frames: true,
            ..Self::silent()
        }
    }

    pub fn failing_audio(audio: AudioBuffer, error: AudioError) -> Self {
        Self {
            audio_error: Some(error),
            ..Self::with_audio(audio)
        }
    }

    pub fn at(mut self, position: Position) -> Self {
        self.playhead.set_position(position);
        self
    }

    pub fn log(&self) -> Arc<Mutex<MockLog>> {
        Arc::clone(&self.log)
    }
}

impl FrameSource for MockSource {
    fn id(&self) -> ProducerId {
        self.id.clone()
    }

    fn get_frame(&mut self, index: usize) -> Result<Frame, ProducerError> {
        let position = self.playhead.position();
        {
            let mut log = self.log.lock().unwrap();
            log.requested_indices.push(index);
            log.frame_positions.push(position);
        }

        if self.fail_frames {
            return Err(ProducerError::Load {
                resource: "mock".to_owned(),
                message: "frame unavailable".to_owned(),
            });
        }

        let mut frame = match &self.audio {
            Some(audio) => Frame::with_audio(position, audio.clone()),
            None => Frame::placeholder(position),
        };
        if let Some(error) = self.audio_error.clone() {
            frame.push_audio(Box::new(
                move |_: &mut Frame, _: AudioRequest| -> Result<AudioBuffer, AudioError> {
                    Err(error)
                },
            ));
        }
        self.playhead.advance();
        Ok(frame)
    }

    fn seek(&mut self, position: Position) -> Result<(), ProducerError> {
        self.log.lock().unwrap().seeks.push(position);
        self.playhead.seek(position);
        Ok(())
    }

    fn position(&self) -> Position {
        self.playhead.position()
    }

    fn set_position(&mut self, position: Position) {
        self.log.lock().unwrap().set_positions.push(position);
        self.playhead.set_position(position);
    }

    fn set_speed(&mut self, speed: f64) {
        self.log.lock().unwrap().speed = Some(speed);
        self.playhead.set_speed(speed);
    }

    fn apply_param_change(&mut self, id: &ProducerId, change: &ParameterChange) {
        if *id == self.id {
            self.log.lock().unwrap().param_changes.push(*change);
        }
    }

    fn close(&mut self) {
        self.log.lock().unwrap().closed += 1;
    }
}
