//! Event orchestration: routes inbound events through the state machine
//! and owns every session/strategy mutation.

use crate::builder::machine;
use crate::builder::store::UserStore;
use crate::indicators::registry::IndicatorRegistry;
use crate::metrics::Metrics;
use crate::models::strategy::Strategy;
use crate::summary;
use crate::transport::{Action, Command, Event, UserId};
use std::sync::Arc;
use tracing::{debug, info};

const WELCOME: &str = "Welcome! Use /newstrategy to start building a trading condition.";
const EMPTY_STRATEGY: &str = "No conditions defined yet. Use /newstrategy to add one.";

pub struct BuilderEngine {
    registry: Arc<IndicatorRegistry>,
    store: UserStore,
    metrics: Option<Arc<Metrics>>,
}

impl BuilderEngine {
    pub fn new(registry: Arc<IndicatorRegistry>) -> Self {
        Self {
            registry,
            store: UserStore::new(),
            metrics: None,
        }
    }

    /// Attach a metrics sink.
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn registry(&self) -> &IndicatorRegistry {
        &self.registry
    }

    /// Process one inbound event for one user and return the replies.
    ///
    /// The user's entry stays locked for the whole turn, so concurrent
    /// events for the same user apply in lock-acquisition order while
    /// other users proceed in parallel.
    pub async fn handle_event(&self, user_id: UserId, event: Event) -> Vec<Action> {
        if let Some(metrics) = &self.metrics {
            metrics.events_total.inc();
        }
        match event {
            Event::Command(Command::Start) => vec![Action::SendText {
                text: WELCOME.to_string(),
            }],
            Event::Command(Command::Done) => self.describe(user_id).await,
            event => self.advance(user_id, event).await,
        }
    }

    async fn advance(&self, user_id: UserId, event: Event) -> Vec<Action> {
        let entry = self.store.entry(user_id).await;
        let mut guard = entry.lock().await;

        let had_session = guard.session.is_some();
        let step = machine::step(&self.registry, guard.session.take(), &event);

        if let Some(condition) = step.finalized {
            info!(
                user_id,
                condition = %summary::describe_condition(&condition),
                "condition finalized"
            );
            guard.strategy.append(condition);
            if let Some(metrics) = &self.metrics {
                metrics.conditions_finalized_total.inc();
            }
        } else if step.actions.is_empty() {
            debug!(user_id, ?event, "event ignored");
        }

        if had_session && matches!(event, Event::Command(Command::Cancel)) {
            if let Some(metrics) = &self.metrics {
                metrics.sessions_cancelled_total.inc();
            }
        }

        guard.session = step.session;
        step.actions
    }

    async fn describe(&self, user_id: UserId) -> Vec<Action> {
        let strategy = self.store.strategy(user_id).await;
        let text = if strategy.conditions.is_empty() {
            EMPTY_STRATEGY.to_string()
        } else {
            summary::describe_strategy(&strategy)
        };
        vec![Action::SendText { text }]
    }

    /// Machine-readable snapshot of one user's strategy.
    pub async fn strategy(&self, user_id: UserId) -> Strategy {
        self.store.strategy(user_id).await
    }
}
