// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Test doubles for the lifecycle workflows: an in-process provider with
//! scriptable failure modes and a notifier that records every event.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use corral_core::domain::events::{RuntimeLifecycleEvent, UpdateNotifier};
use corral_core::domain::provider::{
    DeletionStatus, EndpointStatus, MemoryStatus, ProviderError, RuntimeCreateSpec,
    RuntimeEndpoint, RuntimeProvider, RuntimeStatus, StartedRuntime,
};
use corral_core::domain::records::DEFAULT_QUALIFIER;

struct RuntimeEntry {
    agent_name: String,
    version: u32,
    polls_remaining: u32,
}

struct MemoryEntry {
    name: String,
}

#[derive(Default)]
struct FakeState {
    runtimes: HashMap<String, RuntimeEntry>,
    agents: HashMap<String, String>,
    memories: HashMap<String, MemoryEntry>,
    endpoints: HashMap<(String, String), u32>,
    memory_creations: u32,

    polls_before_ready: u32,
    runtime_never_ready: bool,
    fail_runtime_deletion: bool,
    fail_endpoint_deletion: Option<String>,
}

/// In-process [`RuntimeProvider`] with scriptable failure modes.
#[derive(Default)]
pub struct FakeRuntimeProvider {
    state: Mutex<FakeState>,
}

impl FakeRuntimeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Polls a runtime creation answers `CREATING` before going `READY`.
    pub fn set_polls_before_ready(&self, polls: u32) {
        self.state.lock().unwrap().polls_before_ready = polls;
    }

    /// Runtime creation never reaches `READY`.
    pub fn set_runtime_never_ready(&self) {
        self.state.lock().unwrap().runtime_never_ready = true;
    }

    /// Runtime deletion polls report `FAILED`.
    pub fn set_fail_runtime_deletion(&self) {
        self.state.lock().unwrap().fail_runtime_deletion = true;
    }

    /// Deletion of the named endpoint reports `FAILED`.
    pub fn set_fail_endpoint_deletion(&self, endpoint: &str) {
        self.state.lock().unwrap().fail_endpoint_deletion = Some(endpoint.to_string());
    }

    pub fn endpoint_exists(&self, runtime_id: &str, name: &str) -> bool {
        self.state
            .lock()
            .unwrap()
            .endpoints
            .contains_key(&(runtime_id.to_string(), name.to_string()))
    }

    pub fn runtime_exists(&self, runtime_id: &str) -> bool {
        self.state.lock().unwrap().runtimes.contains_key(runtime_id)
    }

    pub fn memory_creations(&self) -> u32 {
        self.state.lock().unwrap().memory_creations
    }

    pub fn memory_count(&self) -> usize {
        self.state.lock().unwrap().memories.len()
    }
}

#[async_trait]
impl RuntimeProvider for FakeRuntimeProvider {
    async fn start_create_or_update_runtime(
        &self,
        spec: RuntimeCreateSpec,
    ) -> Result<StartedRuntime, ProviderError> {
        let mut state = self.state.lock().unwrap();
        let polls = state.polls_before_ready;

        let runtime_id = match state.agents.get(&spec.agent_name) {
            Some(id) => id.clone(),
            None => {
                let id = format!("rt-{}", spec.agent_name);
                state.agents.insert(spec.agent_name.clone(), id.clone());
                id
            }
        };

        let entry = state
            .runtimes
            .entry(runtime_id.clone())
            .and_modify(|entry| {
                entry.version += 1;
                entry.polls_remaining = polls;
            })
            .or_insert(RuntimeEntry {
                agent_name: spec.agent_name.clone(),
                version: 1,
                polls_remaining: polls,
            });

        Ok(StartedRuntime {
            runtime_arn: format!("arn:corral:runtime/{runtime_id}"),
            runtime_version: entry.version,
            runtime_id,
        })
    }

    async fn poll_runtime(
        &self,
        runtime_id: &str,
        _runtime_version: u32,
    ) -> Result<RuntimeStatus, ProviderError> {
        let mut state = self.state.lock().unwrap();
        if state.runtime_never_ready {
            return Ok(RuntimeStatus::Creating);
        }
        let entry = state
            .runtimes
            .get_mut(runtime_id)
            .ok_or_else(|| ProviderError::NotFound(runtime_id.to_string()))?;
        if entry.polls_remaining > 0 {
            entry.polls_remaining -= 1;
            Ok(RuntimeStatus::Creating)
        } else {
            Ok(RuntimeStatus::Ready)
        }
    }

    async fn start_create_memory(
        &self,
        name: &str,
        _retention_days: u32,
    ) -> Result<String, ProviderError> {
        let mut state = self.state.lock().unwrap();
        state.memory_creations += 1;
        let memory_id = format!("mem-{name}");
        state.memories.insert(
            memory_id.clone(),
            MemoryEntry {
                name: name.to_string(),
            },
        );
        Ok(memory_id)
    }

    async fn poll_memory(&self, memory_id: &str) -> Result<MemoryStatus, ProviderError> {
        let state = self.state.lock().unwrap();
        if state.memories.contains_key(memory_id) {
            Ok(MemoryStatus::Active)
        } else {
            Err(ProviderError::NotFound(memory_id.to_string()))
        }
    }

    async fn find_memory(&self, agent_name: &str) -> Result<Option<String>, ProviderError> {
        let state = self.state.lock().unwrap();
        let wanted = format!("{agent_name}Memory");
        Ok(state
            .memories
            .iter()
            .find(|(_, entry)| entry.name == wanted)
            .map(|(id, _)| id.clone()))
    }

    async fn list_endpoints(
        &self,
        runtime_id: &str,
    ) -> Result<Vec<RuntimeEndpoint>, ProviderError> {
        let state = self.state.lock().unwrap();
        // the HTTP adapter surfaces a 404 here as NotFound
        if !state.runtimes.contains_key(runtime_id) {
            return Err(ProviderError::NotFound(runtime_id.to_string()));
        }
        Ok(state
            .endpoints
            .iter()
            .filter(|((id, name), _)| id == runtime_id && name != DEFAULT_QUALIFIER)
            .map(|((_, name), version)| RuntimeEndpoint {
                name: name.clone(),
                version: *version,
            })
            .collect())
    }

    async fn start_create_endpoint(
        &self,
        runtime_id: &str,
        name: &str,
        runtime_version: u32,
        _description: Option<&str>,
    ) -> Result<(), ProviderError> {
        let mut state = self.state.lock().unwrap();
        state
            .endpoints
            .insert((runtime_id.to_string(), name.to_string()), runtime_version);
        Ok(())
    }

    async fn poll_endpoint(
        &self,
        runtime_id: &str,
        name: &str,
    ) -> Result<EndpointStatus, ProviderError> {
        let state = self.state.lock().unwrap();
        if state
            .endpoints
            .contains_key(&(runtime_id.to_string(), name.to_string()))
        {
            Ok(EndpointStatus::Ready)
        } else {
            Err(ProviderError::NotFound(name.to_string()))
        }
    }

    async fn start_delete_endpoint(
        &self,
        runtime_id: &str,
        name: &str,
    ) -> Result<(), ProviderError> {
        let state = self.state.lock().unwrap();
        if state
            .endpoints
            .contains_key(&(runtime_id.to_string(), name.to_string()))
        {
            Ok(())
        } else {
            Err(ProviderError::NotFound(name.to_string()))
        }
    }

    async fn poll_endpoint_deletion(
        &self,
        runtime_id: &str,
        name: &str,
    ) -> Result<DeletionStatus, ProviderError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_endpoint_deletion.as_deref() == Some(name) {
            return Ok(DeletionStatus::Failed);
        }
        state
            .endpoints
            .remove(&(runtime_id.to_string(), name.to_string()));
        Ok(DeletionStatus::Deleted)
    }

    async fn start_delete_runtime(&self, runtime_id: &str) -> Result<(), ProviderError> {
        let state = self.state.lock().unwrap();
        if state.runtimes.contains_key(runtime_id) {
            Ok(())
        } else {
            Err(ProviderError::NotFound(runtime_id.to_string()))
        }
    }

    async fn poll_runtime_deletion(
        &self,
        runtime_id: &str,
    ) -> Result<DeletionStatus, ProviderError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_runtime_deletion {
            return Ok(DeletionStatus::Failed);
        }
        if let Some(entry) = state.runtimes.remove(runtime_id) {
            state.agents.remove(&entry.agent_name);
        }
        state.endpoints.retain(|(id, _), _| id != runtime_id);
        Ok(DeletionStatus::Deleted)
    }

    async fn start_delete_memory(&self, memory_id: &str) -> Result<(), ProviderError> {
        let state = self.state.lock().unwrap();
        if state.memories.contains_key(memory_id) {
            Ok(())
        } else {
            Err(ProviderError::NotFound(memory_id.to_string()))
        }
    }

    async fn poll_memory_deletion(
        &self,
        memory_id: &str,
    ) -> Result<DeletionStatus, ProviderError> {
        let mut state = self.state.lock().unwrap();
        state.memories.remove(memory_id);
        Ok(DeletionStatus::Deleted)
    }
}

/// Notifier that records every published event in order.
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<RuntimeLifecycleEvent>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RuntimeLifecycleEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl UpdateNotifier for RecordingNotifier {
    fn publish(&self, event: RuntimeLifecycleEvent) {
        self.events.lock().unwrap().push(event);
    }
}
