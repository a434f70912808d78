pub mod position;
pub mod range;
pub mod rate;
