// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain layer: records, configuration, contracts and events of the
//! agent-runtime lifecycle.

pub mod agent;
pub mod error;
pub mod events;
pub mod provider;
pub mod records;
pub mod registry;
pub mod service_config;

pub use agent::AgentConfiguration;
pub use error::LifecycleError;
pub use events::{RuntimeLifecycleEvent, UpdateNotifier, WorkflowKind};
pub use records::{AgentSummaryRecord, AgentVersionRecord, QualifierMap, DEFAULT_QUALIFIER};
