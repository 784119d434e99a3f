//! Transient per-user build-session state.

use crate::models::strategy::{IndicatorRef, Operator};

/// Where the multi-turn condition build currently stands. Parameter
/// cursors index into the indicator's ordered parameter list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    SelectIndicator,
    SetParam { cursor: usize },
    SelectOperator,
    SelectCompareType,
    AwaitCompareValue,
    SelectCompareIndicator,
    SetCompareParam { cursor: usize },
}

/// Draft of the condition under construction. At most one per user,
/// cleared on finalization or cancel; starting a new build replaces it.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildSession {
    pub state: BuildState,
    pub primary: Option<IndicatorRef>,
    pub operator: Option<Operator>,
    pub compare: Option<IndicatorRef>,
}

impl BuildSession {
    pub fn new() -> Self {
        Self {
            state: BuildState::SelectIndicator,
            primary: None,
            operator: None,
            compare: None,
        }
    }
}

impl Default for BuildSession {
    fn default() -> Self {
        Self::new()
    }
}
