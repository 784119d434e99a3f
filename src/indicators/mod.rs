//! Indicator catalog: names, parameter schemas, coercion.

pub mod registry;

pub use registry::{IndicatorRegistry, IndicatorSpec, ParamKind, ParamSpec};
