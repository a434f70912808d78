use log::{debug, trace};
use transport::{
    position::{Playhead, Position},
    range::loop_position,
};

use crate::{
    constants::INTERNAL_SERVICE,
    error::ProducerError,
    factory::Factory,
    frame::Frame,
    producer::{FrameSource, ParameterChange, ProducerId},
    profile::Profile,
};

pub const DEFAULT_FRAME_START: Position = 0;
pub const DEFAULT_FRAME_END: Position = 100;

/// Repeats `[frame_start, frame_end)` of the wrapped source forever.
///
/// Unlike the varispeed producer this keeps its own playhead and seeks the
/// wrapped source for every frame, so the wrapped position is always in range.
#[derive(Debug)]
pub struct FrameRangeFilter {
    id: ProducerId,
    inner: Box<dyn FrameSource>,
    frame_start: Position,
    frame_end: Position,
    playhead: Playhead,
    closed: bool,
}

impl FrameRangeFilter {
    pub fn new(inner: Box<dyn FrameSource>, frame_start: Position, frame_end: Position) -> Self {
        Self {
            id: ProducerId::new(),
            inner,
            frame_start,
            frame_end,
            playhead: Playhead::unbounded(),
            closed: false,
        }
    }

    /// Factory entry point: loads `resource` and loops its first 100 frames.
    pub fn create(
        factory: &Factory,
        profile: &Profile,
        resource: &str,
    ) -> Result<Box<dyn FrameSource>, ProducerError> {
        let inner = factory.producer(profile, INTERNAL_SERVICE, resource)?;
        Ok(Box::new(Self::new(
            inner,
            DEFAULT_FRAME_START,
            DEFAULT_FRAME_END,
        )))
    }

    pub fn frame_start(&self) -> Position {
        self.frame_start
    }

    pub fn frame_end(&self) -> Position {
        self.frame_end
    }
}

impl FrameSource for FrameRangeFilter {
    fn id(&self) -> ProducerId {
        self.id.clone()
    }

    fn get_frame(&mut self, index: usize) -> Result<Frame, ProducerError> {
        let position = self.playhead.position();
        let real = loop_position(position, self.frame_start, self.frame_end);
        trace!("Frame {position} reads source frame {real}");

        self.inner.seek(real)?;
        let mut frame = self.inner.get_frame(index)?;
        frame.set_position(position);

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

    fn apply_param_change(&mut self, id: &ProducerId, change: &ParameterChange) {
        if self.id != *id {
            self.inner.apply_param_change(id, change);
            return;
        }

        match *change {
            ParameterChange::SetStartFrame(start) => self.frame_start = start,
            ParameterChange::SetEndFrame(end) => self.frame_end = end,
            ParameterChange::SetSpeed(speed) => self.set_speed(speed),
            ParameterChange::SetLimitEnabled(_) => {}
        }
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.inner.close();
        self.closed = true;
        debug!("Closed frame range filter {}", self.id);
    }
}

impl Drop for FrameRangeFilter {
    fn drop(&mut self) {
        self.close();
    }
}
