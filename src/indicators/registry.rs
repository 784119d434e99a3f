//! Static indicator catalog and parameter coercion.

use serde_json::{json, Value};

/// Declared kind of one indicator parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Integer,
    Float,
    /// Fixed set of allowed string values.
    Choice,
}

/// Schema for one indicator parameter.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub default: Value,
    pub choices: Option<Vec<&'static str>>,
}

const SOURCES: [&str; 5] = ["Close", "Open", "High", "Low", "HL2"];

impl ParamSpec {
    pub fn integer(name: &'static str, default: i64) -> Self {
        Self {
            name,
            kind: ParamKind::Integer,
            default: json!(default),
            choices: None,
        }
    }

    pub fn float(name: &'static str, default: f64) -> Self {
        Self {
            name,
            kind: ParamKind::Float,
            default: json!(default),
            choices: None,
        }
    }

    pub fn choice(name: &'static str, default: &'static str, choices: &[&'static str]) -> Self {
        Self {
            name,
            kind: ParamKind::Choice,
            default: json!(default),
            choices: Some(choices.to_vec()),
        }
    }

    fn source(default: &'static str) -> Self {
        Self::choice("source", default, &SOURCES)
    }

    /// Coerce raw user input to this parameter's value.
    ///
    /// Invalid input falls back to the declared default; parameter
    /// collection never blocks on a malformed reply.
    pub fn coerce(&self, raw: &str) -> Value {
        let raw = raw.trim();
        match self.kind {
            ParamKind::Choice => match &self.choices {
                Some(choices) if choices.contains(&raw) => json!(raw),
                _ => self.default.clone(),
            },
            ParamKind::Integer => raw
                .parse::<i64>()
                .map(|v| json!(v))
                .unwrap_or_else(|_| self.default.clone()),
            ParamKind::Float => raw
                .parse::<f64>()
                .map(|v| json!(v))
                .unwrap_or_else(|_| self.default.clone()),
        }
    }
}

/// Schema for one indicator: unique name plus ordered parameters.
#[derive(Debug, Clone)]
pub struct IndicatorSpec {
    pub name: &'static str,
    pub params: Vec<ParamSpec>,
}

impl IndicatorSpec {
    pub fn new(name: &'static str, params: Vec<ParamSpec>) -> Self {
        Self { name, params }
    }
}

/// Catalog of available indicators. Loaded once at startup; the single
/// source of truth for parameter names, coercion, and defaults.
#[derive(Debug, Clone)]
pub struct IndicatorRegistry {
    indicators: Vec<IndicatorSpec>,
}

impl IndicatorRegistry {
    /// Registry with the standard catalog.
    pub fn new() -> Self {
        Self::with_indicators(vec![
            IndicatorSpec::new(
                "RSI",
                vec![ParamSpec::integer("period", 14), ParamSpec::source("Close")],
            ),
            IndicatorSpec::new(
                "EMA",
                vec![ParamSpec::integer("period", 20), ParamSpec::source("Close")],
            ),
            IndicatorSpec::new(
                "SMA",
                vec![ParamSpec::integer("period", 50), ParamSpec::source("Close")],
            ),
            IndicatorSpec::new(
                "MACD",
                vec![
                    ParamSpec::integer("fast", 12),
                    ParamSpec::integer("slow", 26),
                    ParamSpec::integer("signal", 9),
                    ParamSpec::source("Close"),
                ],
            ),
            IndicatorSpec::new(
                "Stochastic",
                vec![
                    ParamSpec::integer("k_period", 14),
                    ParamSpec::integer("d_period", 3),
                    ParamSpec::source("High"),
                ],
            ),
            IndicatorSpec::new(
                "BollingerBands",
                vec![
                    ParamSpec::integer("period", 20),
                    ParamSpec::float("stddev", 2.0),
                    ParamSpec::source("Close"),
                ],
            ),
            IndicatorSpec::new("ATR", vec![ParamSpec::integer("period", 14)]),
            IndicatorSpec::new("OBV", vec![ParamSpec::source("Close")]),
        ])
    }

    /// Registry with a custom catalog.
    pub fn with_indicators(indicators: Vec<IndicatorSpec>) -> Self {
        Self { indicators }
    }

    pub fn get(&self, name: &str) -> Option<&IndicatorSpec> {
        self.indicators.iter().find(|spec| spec.name == name)
    }

    /// Indicator names in catalog order.
    pub fn names(&self) -> Vec<&'static str> {
        self.indicators.iter().map(|spec| spec.name).collect()
    }

    /// Ordered parameter names for an indicator.
    pub fn param_keys(&self, name: &str) -> Option<Vec<&'static str>> {
        self.get(name)
            .map(|spec| spec.params.iter().map(|p| p.name).collect())
    }

    /// Coerce raw input for one parameter. `None` if the indicator or
    /// parameter is unknown.
    pub fn coerce(&self, indicator: &str, param: &str, raw: &str) -> Option<Value> {
        self.get(indicator)?
            .params
            .iter()
            .find(|p| p.name == param)
            .map(|p| p.coerce(raw))
    }
}

impl Default for IndicatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
