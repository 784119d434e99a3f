//! Unit tests for the builder engine and dispatcher

use async_trait::async_trait;
use signalsmith::builder::engine::BuilderEngine;
use signalsmith::indicators::registry::IndicatorRegistry;
use signalsmith::transport::{
    Action, ChatTransport, Choice, Command, Dispatcher, Event, TransportError, UserId,
};
use std::sync::{Arc, Mutex};

fn engine() -> Arc<BuilderEngine> {
    Arc::new(BuilderEngine::new(Arc::new(IndicatorRegistry::new())))
}

fn build_events() -> Vec<Event> {
    vec![
        Event::Command(Command::NewStrategy),
        Event::Choice { token: "RSI".to_string() },
        Event::Text { text: "14".to_string() },
        Event::Choice { token: "Close".to_string() },
        Event::Choice { token: ">".to_string() },
        Event::Choice { token: "value".to_string() },
        Event::Text { text: "70".to_string() },
    ]
}

async fn run(engine: &BuilderEngine, user_id: UserId, events: Vec<Event>) -> Vec<Action> {
    let mut last = Vec::new();
    for event in events {
        last = engine.handle_event(user_id, event).await;
    }
    last
}

#[tokio::test]
async fn finalized_condition_lands_in_the_strategy() {
    let engine = engine();
    run(&engine, 7, build_events()).await;

    let strategy = engine.strategy(7).await;
    assert_eq!(strategy.conditions.len(), 1);
    assert_eq!(strategy.conditions[0].primary.indicator, "RSI");
}

#[tokio::test]
async fn restart_never_appends_a_partial_condition() {
    let engine = engine();

    // Abandon one build mid-way, then complete a fresh one.
    run(
        &engine,
        7,
        vec![
            Event::Command(Command::NewStrategy),
            Event::Choice { token: "MACD".to_string() },
            Event::Text { text: "12".to_string() },
        ],
    )
    .await;
    run(&engine, 7, build_events()).await;

    let strategy = engine.strategy(7).await;
    assert_eq!(strategy.conditions.len(), 1);
    assert_eq!(strategy.conditions[0].primary.indicator, "RSI");
}

#[tokio::test]
async fn cancel_leaves_the_strategy_untouched() {
    let engine = engine();
    run(
        &engine,
        7,
        vec![
            Event::Command(Command::NewStrategy),
            Event::Choice { token: "RSI".to_string() },
            Event::Command(Command::Cancel),
        ],
    )
    .await;

    assert!(engine.strategy(7).await.conditions.is_empty());
}

#[tokio::test]
async fn users_are_isolated() {
    let engine = engine();

    // Interleave two users' events turn by turn.
    let events_a = build_events();
    let events_b = vec![
        Event::Command(Command::NewStrategy),
        Event::Choice { token: "ATR".to_string() },
        Event::Text { text: "14".to_string() },
        Event::Choice { token: "<".to_string() },
        Event::Choice { token: "value".to_string() },
        Event::Text { text: "5".to_string() },
    ];
    let mut a = events_a.into_iter();
    let mut b = events_b.into_iter();
    loop {
        match (a.next(), b.next()) {
            (None, None) => break,
            (ea, eb) => {
                if let Some(event) = ea {
                    engine.handle_event(1, event).await;
                }
                if let Some(event) = eb {
                    engine.handle_event(2, event).await;
                }
            }
        }
    }

    let strategy_a = engine.strategy(1).await;
    let strategy_b = engine.strategy(2).await;
    assert_eq!(strategy_a.conditions.len(), 1);
    assert_eq!(strategy_a.conditions[0].primary.indicator, "RSI");
    assert_eq!(strategy_b.conditions.len(), 1);
    assert_eq!(strategy_b.conditions[0].primary.indicator, "ATR");
}

#[tokio::test]
async fn concurrent_users_complete_independently() {
    let engine = engine();
    let mut handles = Vec::new();
    for user_id in 1..=8 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            run(&engine, user_id, build_events()).await;
        }));
    }
    for handle in handles {
        handle.await.expect("task completed");
    }
    for user_id in 1..=8 {
        assert_eq!(engine.strategy(user_id).await.conditions.len(), 1);
    }
}

#[tokio::test]
async fn start_returns_the_welcome_text() {
    let engine = engine();
    let actions = engine.handle_event(7, Event::Command(Command::Start)).await;
    match &actions[0] {
        Action::SendText { text } => assert!(text.contains("/newstrategy")),
        other => panic!("expected text, got {:?}", other),
    }
}

#[tokio::test]
async fn done_reports_an_empty_strategy() {
    let engine = engine();
    let actions = engine.handle_event(7, Event::Command(Command::Done)).await;
    match &actions[0] {
        Action::SendText { text } => assert!(text.contains("No conditions defined yet")),
        other => panic!("expected text, got {:?}", other),
    }
}

#[tokio::test]
async fn done_lists_conditions_numbered_from_one() {
    let engine = engine();
    run(&engine, 7, build_events()).await;

    let actions = engine.handle_event(7, Event::Command(Command::Done)).await;
    match &actions[0] {
        Action::SendText { text } => {
            assert!(text.contains("1. RSI(period=14, source=Close) > 70"), "got: {}", text);
        }
        other => panic!("expected text, got {:?}", other),
    }
}

#[derive(Clone, Default)]
struct RecordingTransport {
    sent: Arc<Mutex<Vec<(UserId, Action)>>>,
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn send_text(&self, user_id: UserId, text: &str) -> Result<(), TransportError> {
        self.sent.lock().unwrap().push((
            user_id,
            Action::SendText { text: text.to_string() },
        ));
        Ok(())
    }

    async fn send_choice_prompt(
        &self,
        user_id: UserId,
        text: &str,
        choices: &[Choice],
    ) -> Result<(), TransportError> {
        self.sent.lock().unwrap().push((
            user_id,
            Action::SendChoicePrompt {
                text: text.to_string(),
                choices: choices.to_vec(),
            },
        ));
        Ok(())
    }
}

struct OfflineTransport;

#[async_trait]
impl ChatTransport for OfflineTransport {
    async fn send_text(&self, user_id: UserId, _text: &str) -> Result<(), TransportError> {
        Err(TransportError::Delivery {
            user_id,
            reason: "offline".to_string(),
        })
    }

    async fn send_choice_prompt(
        &self,
        user_id: UserId,
        _text: &str,
        _choices: &[Choice],
    ) -> Result<(), TransportError> {
        Err(TransportError::Delivery {
            user_id,
            reason: "offline".to_string(),
        })
    }
}

#[tokio::test]
async fn dispatcher_delivers_actions_to_the_transport() {
    let engine = engine();
    let transport = RecordingTransport::default();
    let dispatcher = Dispatcher::new(engine, transport.clone());

    dispatcher.dispatch(7, Event::Command(Command::NewStrategy)).await;

    let sent = transport.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, 7);
    match &sent[0].1 {
        Action::SendChoicePrompt { choices, .. } => {
            assert!(choices.iter().any(|c| c.token == "RSI"));
        }
        other => panic!("expected choice prompt, got {:?}", other),
    }
}

#[tokio::test]
async fn delivery_failure_does_not_roll_back_state() {
    let engine = engine();
    let dispatcher = Dispatcher::new(engine.clone(), OfflineTransport);

    for event in build_events() {
        dispatcher.dispatch(7, event).await;
    }

    // Every send failed, yet the transitions all committed.
    assert_eq!(engine.strategy(7).await.conditions.len(), 1);
}
