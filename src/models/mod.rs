//! Shared data models spanning the builder layers.

pub mod session;
pub mod strategy;

pub use session::{BuildSession, BuildState};
pub use strategy::{CombineLogic, CompareTarget, Condition, IndicatorRef, Operator, Strategy};
