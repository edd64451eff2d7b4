// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Broadcast Notifier - Pub/Sub for Lifecycle Events
//!
//! In-memory event fan-out using tokio broadcast channels. Feeds the SSE
//! endpoint and any in-process observer.
//!
//! For MVP: in-memory only (events lost on restart)

use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::domain::events::{RuntimeLifecycleEvent, UpdateNotifier};

/// Fan-out of lifecycle events to all subscribers.
#[derive(Clone)]
pub struct BroadcastNotifier {
    sender: Arc<broadcast::Sender<RuntimeLifecycleEvent>>,
}

impl BroadcastNotifier {
    /// Capacity bounds the per-subscriber buffer; slow subscribers observe
    /// `Lagged` once older events are overwritten.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Default capacity (1000)
    pub fn with_default_capacity() -> Self {
        Self::new(1000)
    }

    /// Subscribe to all lifecycle events.
    pub fn subscribe(&self) -> EventReceiver {
        EventReceiver {
            receiver: self.sender.subscribe(),
            agent_name: None,
        }
    }

    /// Subscribe to events for one agent only.
    pub fn subscribe_agent(&self, agent_name: impl Into<String>) -> EventReceiver {
        EventReceiver {
            receiver: self.sender.subscribe(),
            agent_name: Some(agent_name.into()),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

impl UpdateNotifier for BroadcastNotifier {
    fn publish(&self, event: RuntimeLifecycleEvent) {
        debug!(agent_name = event.agent_name(), "publishing lifecycle event");
        let receiver_count = self.sender.send(event).unwrap_or(0);
        if receiver_count == 0 {
            debug!("no subscribers listening");
        }
    }
}

/// Receiver for lifecycle events, optionally filtered by agent name.
pub struct EventReceiver {
    receiver: broadcast::Receiver<RuntimeLifecycleEvent>,
    agent_name: Option<String>,
}

impl EventReceiver {
    /// Next matching event; skips events for other agents when filtered.
    pub async fn recv(&mut self) -> Result<RuntimeLifecycleEvent, NotifierError> {
        loop {
            let event = self.receiver.recv().await.map_err(|err| match err {
                broadcast::error::RecvError::Closed => NotifierError::Closed,
                broadcast::error::RecvError::Lagged(n) => {
                    warn!("event receiver lagged by {} events", n);
                    NotifierError::Lagged(n)
                }
            })?;

            match &self.agent_name {
                Some(name) if event.agent_name() != name => continue,
                _ => return Ok(event),
            }
        }
    }

    pub fn try_recv(&mut self) -> Result<RuntimeLifecycleEvent, NotifierError> {
        loop {
            let event = self.receiver.try_recv().map_err(|err| match err {
                broadcast::error::TryRecvError::Empty => NotifierError::Empty,
                broadcast::error::TryRecvError::Closed => NotifierError::Closed,
                broadcast::error::TryRecvError::Lagged(n) => NotifierError::Lagged(n),
            })?;

            match &self.agent_name {
                Some(name) if event.agent_name() != name => continue,
                _ => return Ok(event),
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NotifierError {
    #[error("notifier is closed")]
    Closed,

    #[error("no events available")]
    Empty,

    #[error("receiver lagged by {0} events (events were dropped)")]
    Lagged(u64),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::events::WorkflowKind;
    use chrono::Utc;

    #[tokio::test]
    async fn publish_reaches_subscriber() {
        let notifier = BroadcastNotifier::new(10);
        let mut receiver = notifier.subscribe();

        notifier.publish(RuntimeLifecycleEvent::RuntimeUpdated {
            agent_name: "demo_agent".to_string(),
            runtime_version: 3,
            occurred_at: Utc::now(),
        });

        match receiver.recv().await.unwrap() {
            RuntimeLifecycleEvent::RuntimeUpdated {
                agent_name,
                runtime_version,
                ..
            } => {
                assert_eq!(agent_name, "demo_agent");
                assert_eq!(runtime_version, 3);
            }
            other => panic!("wrong event received: {other:?}"),
        }
    }

    #[tokio::test]
    async fn agent_filter_skips_other_agents() {
        let notifier = BroadcastNotifier::new(10);
        let mut receiver = notifier.subscribe_agent("demo_agent");

        notifier.publish(RuntimeLifecycleEvent::RuntimeDeleted {
            agent_name: "unrelated".to_string(),
            occurred_at: Utc::now(),
        });
        notifier.publish(RuntimeLifecycleEvent::WorkflowFailed {
            agent_name: "demo_agent".to_string(),
            workflow: WorkflowKind::DeleteRuntime,
            reason: "boom".to_string(),
            occurred_at: Utc::now(),
        });

        match receiver.recv().await.unwrap() {
            RuntimeLifecycleEvent::WorkflowFailed { agent_name, .. } => {
                assert_eq!(agent_name, "demo_agent");
            }
            other => panic!("filter let through: {other:?}"),
        }
    }

    #[tokio::test]
    async fn publish_without_subscribers_does_not_panic() {
        let notifier = BroadcastNotifier::new(10);
        assert_eq!(notifier.subscriber_count(), 0);
        notifier.publish(RuntimeLifecycleEvent::RuntimeDeleted {
            agent_name: "demo_agent".to_string(),
            occurred_at: Utc::now(),
        });
    }
}
