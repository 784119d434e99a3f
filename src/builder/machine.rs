//! State-transition function for the condition build protocol.
//!
//! Pure: consumes the current session and one event, produces the next
//! session, an optional finalized condition, and the outbound replies.
//! The engine owns the stores and applies the result under the user's
//! lock.

use crate::indicators::registry::{IndicatorRegistry, ParamSpec};
use crate::models::session::{BuildSession, BuildState};
use crate::models::strategy::{CompareTarget, Condition, IndicatorRef, Operator};
use crate::summary;
use crate::transport::{Action, Choice, Command, Event};

/// Result of one protocol step.
#[derive(Debug)]
pub struct Step {
    /// Session after the event; `None` when idle, finalized, or cancelled.
    pub session: Option<BuildSession>,
    /// Condition to commit. Set exactly once per completed build; the
    /// strategy is never touched before this.
    pub finalized: Option<Condition>,
    pub actions: Vec<Action>,
}

impl Step {
    fn stay(session: Option<BuildSession>, actions: Vec<Action>) -> Self {
        Self {
            session,
            finalized: None,
            actions,
        }
    }

    fn ignore(session: Option<BuildSession>) -> Self {
        Self::stay(session, Vec::new())
    }
}

/// Advance one user's build by one event.
pub fn step(registry: &IndicatorRegistry, session: Option<BuildSession>, event: &Event) -> Step {
    match event {
        Event::Command(Command::NewStrategy) => begin(registry),
        Event::Command(Command::Cancel) => cancel(session),
        // /start and /done are stateless; the engine answers them directly.
        Event::Command(_) => Step::ignore(session),
        Event::Choice { token } => on_choice(registry, session, token),
        Event::Text { text } => on_text(registry, session, text),
    }
}

fn begin(registry: &IndicatorRegistry) -> Step {
    // Any unfinished session is silently replaced.
    Step::stay(
        Some(BuildSession::new()),
        vec![indicator_prompt(
            registry,
            "Choose an indicator for your condition:",
        )],
    )
}

fn cancel(session: Option<BuildSession>) -> Step {
    let text = if session.is_some() {
        "Condition build cancelled."
    } else {
        "No condition build in progress."
    };
    Step::stay(None, vec![text_action(text)])
}

fn on_choice(registry: &IndicatorRegistry, session: Option<BuildSession>, token: &str) -> Step {
    let Some(session) = session else {
        return Step::ignore(None);
    };
    match session.state {
        BuildState::SelectIndicator => select_indicator(registry, session, token),
        BuildState::SetParam { cursor } => set_param(registry, session, cursor, token),
        BuildState::SelectOperator => select_operator(registry, session, token),
        BuildState::SelectCompareType => select_compare_type(registry, session, token),
        BuildState::SelectCompareIndicator => select_compare_indicator(registry, session, token),
        BuildState::SetCompareParam { cursor } => {
            set_compare_param(registry, session, cursor, token)
        }
        // Buttons are not valid input for the literal value.
        BuildState::AwaitCompareValue => Step::ignore(Some(session)),
    }
}

fn on_text(registry: &IndicatorRegistry, session: Option<BuildSession>, text: &str) -> Step {
    let Some(session) = session else {
        return Step::ignore(None);
    };
    match session.state {
        BuildState::AwaitCompareValue => await_compare_value(session, text),
        // Free text stands in for a button reply while collecting params.
        BuildState::SetParam { cursor } => set_param(registry, session, cursor, text),
        BuildState::SetCompareParam { cursor } => {
            set_compare_param(registry, session, cursor, text)
        }
        _ => Step::ignore(Some(session)),
    }
}

fn select_indicator(registry: &IndicatorRegistry, mut session: BuildSession, token: &str) -> Step {
    // Unknown indicator tokens are dropped without advancing.
    let Some(spec) = registry.get(token) else {
        return Step::ignore(Some(session));
    };
    session.primary = Some(IndicatorRef::new(spec.name));
    if spec.params.is_empty() {
        session.state = BuildState::SelectOperator;
        Step::stay(
            Some(session),
            vec![
                text_action(&format!("Selected indicator: {}", spec.name)),
                operator_prompt(),
            ],
        )
    } else {
        session.state = BuildState::SetParam { cursor: 0 };
        Step::stay(Some(session), vec![param_prompt(&spec.params[0])])
    }
}

fn set_param(
    registry: &IndicatorRegistry,
    mut session: BuildSession,
    cursor: usize,
    raw: &str,
) -> Step {
    // SetParam is only reachable with a primary draft in place; a missing
    // one means a corrupt session, which is dropped.
    let Some(primary) = session.primary.as_mut() else {
        return Step::stay(None, Vec::new());
    };
    let Some(spec) = registry.get(&primary.indicator) else {
        return Step::stay(None, Vec::new());
    };
    let Some(param) = spec.params.get(cursor) else {
        return Step::stay(None, Vec::new());
    };
    primary.params.insert(param.name.to_string(), param.coerce(raw));
    let params_text = params_summary(primary);

    let next = cursor + 1;
    if next < spec.params.len() {
        session.state = BuildState::SetParam { cursor: next };
        Step::stay(Some(session), vec![param_prompt(&spec.params[next])])
    } else {
        session.state = BuildState::SelectOperator;
        Step::stay(
            Some(session),
            vec![
                text_action(&format!("Parameters set: {}", params_text)),
                operator_prompt(),
            ],
        )
    }
}

fn select_operator(registry: &IndicatorRegistry, mut session: BuildSession, token: &str) -> Step {
    let Some(operator) = Operator::from_token(token) else {
        return Step::ignore(Some(session));
    };
    session.operator = Some(operator);
    if operator.requires_indicator_target() {
        // Crossing comparisons only make sense against another series, so
        // the value/indicator fork is skipped entirely.
        session.state = BuildState::SelectCompareIndicator;
        Step::stay(
            Some(session),
            vec![indicator_prompt(registry, "Choose a compare-to indicator:")],
        )
    } else {
        session.state = BuildState::SelectCompareType;
        Step::stay(
            Some(session),
            vec![Action::SendChoicePrompt {
                text: format!(
                    "Operator set: {}\nCompare against a fixed value or another indicator?",
                    operator.token()
                ),
                choices: vec![
                    Choice {
                        label: "Value".to_string(),
                        token: "value".to_string(),
                    },
                    Choice {
                        label: "Indicator".to_string(),
                        token: "indicator".to_string(),
                    },
                ],
            }],
        )
    }
}

fn select_compare_type(
    registry: &IndicatorRegistry,
    mut session: BuildSession,
    token: &str,
) -> Step {
    match token {
        "value" => {
            session.state = BuildState::AwaitCompareValue;
            Step::stay(
                Some(session),
                vec![text_action("Send the numeric value to compare against:")],
            )
        }
        "indicator" => {
            session.state = BuildState::SelectCompareIndicator;
            Step::stay(
                Some(session),
                vec![indicator_prompt(registry, "Choose a compare-to indicator:")],
            )
        }
        _ => Step::ignore(Some(session)),
    }
}

fn await_compare_value(session: BuildSession, text: &str) -> Step {
    // Strict here, unlike parameter coercion: bad input re-prompts and the
    // turn does not advance.
    let Ok(value) = text.trim().parse::<f64>() else {
        return Step::stay(
            Some(session),
            vec![text_action("Please send a valid number.")],
        );
    };
    finalize(session, CompareTarget::Value { value })
}

fn select_compare_indicator(
    registry: &IndicatorRegistry,
    mut session: BuildSession,
    token: &str,
) -> Step {
    let Some(spec) = registry.get(token) else {
        return Step::ignore(Some(session));
    };
    if spec.params.is_empty() {
        finalize(session, CompareTarget::Indicator(IndicatorRef::new(spec.name)))
    } else {
        session.compare = Some(IndicatorRef::new(spec.name));
        session.state = BuildState::SetCompareParam { cursor: 0 };
        Step::stay(
            Some(session),
            vec![
                text_action(&format!(
                    "Set parameters for compare-to indicator '{}':",
                    spec.name
                )),
                param_prompt(&spec.params[0]),
            ],
        )
    }
}

fn set_compare_param(
    registry: &IndicatorRegistry,
    mut session: BuildSession,
    cursor: usize,
    raw: &str,
) -> Step {
    let Some(compare) = session.compare.as_mut() else {
        return Step::stay(None, Vec::new());
    };
    let Some(spec) = registry.get(&compare.indicator) else {
        return Step::stay(None, Vec::new());
    };
    let Some(param) = spec.params.get(cursor) else {
        return Step::stay(None, Vec::new());
    };
    compare.params.insert(param.name.to_string(), param.coerce(raw));

    let next = cursor + 1;
    if next < spec.params.len() {
        session.state = BuildState::SetCompareParam { cursor: next };
        Step::stay(Some(session), vec![param_prompt(&spec.params[next])])
    } else {
        let Some(compare) = session.compare.take() else {
            return Step::stay(None, Vec::new());
        };
        finalize(session, CompareTarget::Indicator(compare))
    }
}

fn finalize(session: BuildSession, compare_to: CompareTarget) -> Step {
    // A condition only becomes visible once every part is resolved; an
    // incomplete draft is dropped instead of committed.
    let (Some(primary), Some(operator)) = (session.primary, session.operator) else {
        return Step::stay(None, Vec::new());
    };
    let condition = Condition {
        primary,
        operator,
        compare_to,
    };
    let text = format!(
        "Condition added:\n{}\nUse /newstrategy to add another or /done to review.",
        summary::describe_condition(&condition)
    );
    Step {
        session: None,
        finalized: Some(condition),
        actions: vec![Action::SendText { text }],
    }
}

fn params_summary(indicator: &IndicatorRef) -> String {
    indicator
        .params
        .iter()
        .map(|(name, value)| format!("{}={}", name, summary::value_str(value)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn text_action(text: &str) -> Action {
    Action::SendText {
        text: text.to_string(),
    }
}

fn indicator_prompt(registry: &IndicatorRegistry, text: &str) -> Action {
    Action::SendChoicePrompt {
        text: text.to_string(),
        choices: registry.names().into_iter().map(Choice::plain).collect(),
    }
}

fn operator_prompt() -> Action {
    Action::SendChoicePrompt {
        text: "Choose an operator:".to_string(),
        choices: Operator::ALL
            .iter()
            .map(|op| Choice::plain(op.token()))
            .collect(),
    }
}

fn param_prompt(param: &ParamSpec) -> Action {
    let text = format!(
        "Set value for '{}' (default={}):",
        param.name,
        summary::value_str(&param.default)
    );
    match &param.choices {
        Some(choices) => Action::SendChoicePrompt {
            text,
            choices: choices.iter().map(|c| Choice::plain(*c)).collect(),
        },
        None => Action::SendText { text },
    }
}
