//! Human-readable rendering of conditions and strategies.
//!
//! The machine-readable form is the serde model itself; this module only
//! formats for chat display.

use crate::models::strategy::{CompareTarget, Condition, IndicatorRef, Strategy};
use serde_json::Value;

/// Render a parameter value for display: strings bare, everything else as
/// its JSON text.
pub fn value_str(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn number_str(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

fn indicator_str(indicator: &IndicatorRef) -> String {
    let params: Vec<String> = indicator
        .params
        .iter()
        .map(|(name, value)| format!("{}={}", name, value_str(value)))
        .collect();
    format!("{}({})", indicator.indicator, params.join(", "))
}

/// `RSI(period=14, source=Close) > 70`
pub fn describe_condition(condition: &Condition) -> String {
    let target = match &condition.compare_to {
        CompareTarget::Value { value } => number_str(*value),
        CompareTarget::Indicator(indicator) => indicator_str(indicator),
    };
    format!(
        "{} {} {}",
        indicator_str(&condition.primary),
        condition.operator.token(),
        target
    )
}

/// Numbered list of a strategy's conditions under its combine logic.
pub fn describe_strategy(strategy: &Strategy) -> String {
    let mut out = format!("Your strategy conditions ({}):\n", strategy.logic.label());
    for (i, condition) in strategy.conditions.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, describe_condition(condition)));
    }
    out.trim_end().to_string()
}
