use std::fmt;

use transport::position::Position;
use uuid::Uuid;

use crate::{error::ProducerError, frame::Frame};

pub mod blank;
pub mod loader;
#[cfg(test)]
pub mod mock;
pub mod tone;
pub mod varispeed;
pub mod wav;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProducerId(String);

impl ProducerId {
    pub fn new() -> Self {
        Uuid::new_v4().into()
    }
}

impl Default for ProducerId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for ProducerId {
    fn from(value: Uuid) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for ProducerId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl fmt::Display for ProducerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Runtime reconfiguration addressed to one producer in a chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParameterChange {
    SetSpeed(f64),
    SetLimitEnabled(bool),
    SetStartFrame(Position),
    SetEndFrame(Position),
}

/// Produces frames for an advancing playhead.
///
/// Decorators implement this by owning another `FrameSource` and forwarding
/// to it.
pub trait FrameSource
where
    Self: Send + fmt::Debug,
{
    fn id(&self) -> ProducerId;

    /// Produces the frame at the current playhead and advances it.
    ///
    /// `index` identifies the requesting lane and is forwarded untouched
    /// through decorators; it does not select the position.
    fn get_frame(&mut self, index: usize) -> Result<Frame, ProducerError>;

    fn seek(&mut self, position: Position) -> Result<(), ProducerError>;

    fn position(&self) -> Position;

    /// Overwrites the playhead directly, without seek clamping.
    fn set_position(&mut self, position: Position);

    fn set_speed(&mut self, speed: f64);

    /// Applies `change` if `id` names this producer, otherwise forwards it inward.
    fn apply_param_change(&mut self, _id: &ProducerId, _change: &ParameterChange) {}

    /// Releases held resources. Calling it again has no effect.
    fn close(&mut self) {}
}
