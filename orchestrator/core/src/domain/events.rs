// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Lifecycle events and the notification contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The workflow that produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowKind {
    CreateOrUpdate,
    TagVersion,
    DeleteEndpoints,
    DeleteRuntime,
}

/// Event broadcast after every workflow outcome, keyed by agent name.
///
/// Events published by a single workflow instance are observed in publish
/// order; across workflows no ordering is guaranteed and subscribers should
/// re-fetch authoritative state instead of reconstructing it from events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuntimeLifecycleEvent {
    RuntimeUpdated {
        agent_name: String,
        runtime_version: u32,
        occurred_at: DateTime<Utc>,
    },
    EndpointsDeleted {
        agent_name: String,
        endpoints: Vec<String>,
        occurred_at: DateTime<Utc>,
    },
    RuntimeDeleted {
        agent_name: String,
        occurred_at: DateTime<Utc>,
    },
    WorkflowFailed {
        agent_name: String,
        workflow: WorkflowKind,
        reason: String,
        occurred_at: DateTime<Utc>,
    },
}

impl RuntimeLifecycleEvent {
    pub fn agent_name(&self) -> &str {
        match self {
            RuntimeLifecycleEvent::RuntimeUpdated { agent_name, .. }
            | RuntimeLifecycleEvent::EndpointsDeleted { agent_name, .. }
            | RuntimeLifecycleEvent::RuntimeDeleted { agent_name, .. }
            | RuntimeLifecycleEvent::WorkflowFailed { agent_name, .. } => agent_name,
        }
    }
}

/// Fire-and-forget broadcast of lifecycle events.
///
/// Publishing is best-effort: failures are logged and swallowed, a workflow
/// never fails because its notification could not be delivered.
pub trait UpdateNotifier: Send + Sync {
    fn publish(&self, event: RuntimeLifecycleEvent);
}
