//! Strategy and condition data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Comparison operators between an indicator series and its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Operator {
    LessThan,
    GreaterThan,
    Equal,
    CrossesAbove,
    CrossesBelow,
    InZone,
}

impl Operator {
    pub const ALL: [Operator; 6] = [
        Operator::LessThan,
        Operator::GreaterThan,
        Operator::Equal,
        Operator::CrossesAbove,
        Operator::CrossesBelow,
        Operator::InZone,
    ];

    /// Display token, also used as the button callback token.
    pub fn token(&self) -> &'static str {
        match self {
            Operator::LessThan => "<",
            Operator::GreaterThan => ">",
            Operator::Equal => "==",
            Operator::CrossesAbove => "crosses_above",
            Operator::CrossesBelow => "crosses_below",
            Operator::InZone => "in_zone",
        }
    }

    pub fn from_token(token: &str) -> Option<Operator> {
        Operator::ALL.iter().copied().find(|op| op.token() == token)
    }

    /// Crossing comparisons are only meaningful between two series; a
    /// literal target is not representable for them.
    pub fn requires_indicator_target(&self) -> bool {
        matches!(self, Operator::CrossesAbove | Operator::CrossesBelow)
    }
}

/// A named indicator with bound parameter values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRef {
    pub indicator: String,
    #[serde(default)]
    pub params: BTreeMap<String, Value>,
}

impl IndicatorRef {
    pub fn new(indicator: impl Into<String>) -> Self {
        Self {
            indicator: indicator.into(),
            params: BTreeMap::new(),
        }
    }
}

/// What the primary indicator is compared against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CompareTarget {
    Value { value: f64 },
    Indicator(IndicatorRef),
}

/// One fully-resolved comparison. Only ever constructed at finalization,
/// with every part present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(flatten)]
    pub primary: IndicatorRef,
    pub operator: Operator,
    pub compare_to: CompareTarget,
}

/// How a strategy's conditions combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CombineLogic {
    And,
    Or,
}

impl CombineLogic {
    pub fn label(&self) -> &'static str {
        match self {
            CombineLogic::And => "AND",
            CombineLogic::Or => "OR",
        }
    }
}

/// Per-user strategy: ordered conditions under one combine logic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Strategy {
    pub logic: CombineLogic,
    pub conditions: Vec<Condition>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Strategy {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            logic: CombineLogic::And,
            conditions: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a finalized condition. The sole mutation path for the
    /// condition list.
    pub fn append(&mut self, condition: Condition) {
        self.conditions.push(condition);
        self.updated_at = Utc::now();
    }
}

impl Default for Strategy {
    fn default() -> Self {
        Self::new()
    }
}
