use rtrb::{Consumer, Producer};
use transport::position::Position;

use crate::producer::{ParameterChange, ProducerId};

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCommand {
    Play,
    Pause,
    Seek(Position),
    ParamChange {
        target_id: ProducerId,
        change: ParameterChange,
    },
}

pub type PlayerCommandProducer = Producer<PlayerCommand>;
pub type PlayerCommandConsumer = Consumer<PlayerCommand>;
