//! Signalsmith — conversational strategy condition builder.
//!
//! Walks a chat user through assembling one trading-signal condition
//! (indicator, parameters, operator, comparison target) over multiple
//! turns, then appends it to that user's strategy. Indicator math and the
//! chat wire format live outside this crate: the transport adapter feeds
//! [`transport::Event`]s in and delivers [`transport::Action`]s back out.

pub mod builder;
pub mod config;
pub mod core;
pub mod indicators;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod summary;
pub mod transport;
pub mod webapp;
