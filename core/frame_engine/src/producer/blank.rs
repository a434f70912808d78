use transport::position::{Playhead, Position};

use crate::{
    error::ProducerError,
    factory::Factory,
    frame::Frame,
    producer::{FrameSource, ProducerId},
    profile::Profile,
};

/// Endless source of placeholder frames carrying no audio.
#[derive(Debug, Clone)]
pub struct BlankProducer {
    id: ProducerId,
    playhead: Playhead,
}

impl BlankProducer {
    pub fn new() -> Self {
        Self {
            id: ProducerId::new(),
            playhead: Playhead::unbounded(),
        }
    }

    pub fn create(
        _factory: &Factory,
        _profile: &Profile,
        _resource: &str,
    ) -> Result<Box<dyn FrameSource>, ProducerError> {
        Ok(Box::new(Self::new()))
    }
}

impl Default for BlankProducer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSource for BlankProducer {
    fn id(&self) -> ProducerId {
        self.id.clone()
    }

    fn get_frame(&mut self, _index: usize) -> Result<Frame, ProducerError> {
        let frame = Frame::placeholder(self.playhead.position());
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
