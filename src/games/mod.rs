//! Rule sets plugged into the round engine.

pub mod guess;
pub mod search;
