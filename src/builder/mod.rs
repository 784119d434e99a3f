//! Interactive condition builder: state machine, per-user stores, engine.

pub mod engine;
pub mod machine;
pub mod store;

pub use engine::BuilderEngine;
pub use machine::{step, Step};
pub use store::{UserEntry, UserStore};
