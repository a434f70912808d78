/// Frame index on a producer's timeline.
pub type Position = i64;

/// Tracks where a producer is reading and how fast it moves.
///
/// The fractional part of the playhead is kept so speeds below 1.0 still
/// make progress across successive frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Playhead {
    frame: f64,
    speed: f64,
    /// Number of frames available, `None` for unbounded sources
    length: Option<Position>,
}

impl Playhead {
    pub fn new(length: Option<Position>) -> Self {
        Self {
            frame: 0.0,
            speed: 1.0,
            length,
        }
    }

    pub fn unbounded() -> Self {
        Self::new(None)
    }

    pub fn position(&self) -> Position {
        self.frame.floor() as Position
    }

    /// Writes the position directly, without clamping to the source length.
    pub fn set_position(&mut self, position: Position) {
        self.frame = position as f64;
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
    }

    pub fn length(&self) -> Option<Position> {
        self.length
    }

    /// Moves to `position`, clamped to `[0, length - 1]`.
    pub fn seek(&mut self, position: Position) {
        let mut target = position.max(0);
        if let Some(length) = self.length {
            target = target.min((length - 1).max(0));
        }
        self.frame = target as f64;
    }

    /// Steps the playhead forward by the current speed.
    pub fn advance(&mut self) {
        self.frame += self.speed;
    }

    pub fn is_past_end(&self) -> bool {
        let position = self.position();
        position < 0 || self.length.is_some_and(|length| position >= length)
    }
}

impl Default for Playhead {
    fn default() -> Self {
        Self::unbounded()
    }
}
