// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Remote Runtime Provider contract.
//!
//! The provider owns the live state of runtimes, endpoints and memory
//! resources. Every mutating call is asynchronous on the remote side: the
//! start call returns immediately and completion is observed by polling.
//! Poll reads are idempotent, and a "not found" answer while polling a
//! deletion is a terminal success (the resource is gone).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Request to create a runtime, or to add a version to an existing one.
/// The provider distinguishes create from update by the agent name alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeCreateSpec {
    pub agent_name: String,
    pub container_uri: String,
    pub execution_role_arn: String,
    pub environment: HashMap<String, String>,
}

/// Identifiers handed back as soon as a create/update has been accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartedRuntime {
    pub runtime_id: String,
    pub runtime_arn: String,
    pub runtime_version: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuntimeStatus {
    Creating,
    Updating,
    Ready,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemoryStatus {
    Creating,
    Active,
    Deleting,
    Deleted,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EndpointStatus {
    Creating,
    Ready,
    Updating,
    Deleting,
    Deleted,
    Failed,
}

/// Terminal-state observation for a deletion poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeletionStatus {
    Deleting,
    Deleted,
    Failed,
}

/// A named alias pointing at a specific runtime version.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeEndpoint {
    pub name: String,
    pub version: u32,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("remote call failed: {0}")]
    Remote(String),

    #[error("resource not found: {0}")]
    NotFound(String),
}

/// External capability that materializes runtimes, endpoints and memory.
#[async_trait]
pub trait RuntimeProvider: Send + Sync {
    /// Start creating the runtime, or a new version of it when the name is
    /// already known to the provider.
    async fn start_create_or_update_runtime(
        &self,
        spec: RuntimeCreateSpec,
    ) -> Result<StartedRuntime, ProviderError>;

    async fn poll_runtime(
        &self,
        runtime_id: &str,
        runtime_version: u32,
    ) -> Result<RuntimeStatus, ProviderError>;

    /// Start creating a memory resource; returns the provider-assigned id.
    async fn start_create_memory(
        &self,
        name: &str,
        retention_days: u32,
    ) -> Result<String, ProviderError>;

    async fn poll_memory(&self, memory_id: &str) -> Result<MemoryStatus, ProviderError>;

    /// Live lookup of the memory resource attached to an agent, if any.
    /// Memory presence is not tracked locally, so workflows ask the provider
    /// each time; a concurrent create may not be visible yet.
    async fn find_memory(&self, agent_name: &str) -> Result<Option<String>, ProviderError>;

    /// Non-DEFAULT endpoints currently routable for the runtime.
    async fn list_endpoints(
        &self,
        runtime_id: &str,
    ) -> Result<Vec<RuntimeEndpoint>, ProviderError>;

    async fn start_create_endpoint(
        &self,
        runtime_id: &str,
        name: &str,
        runtime_version: u32,
        description: Option<&str>,
    ) -> Result<(), ProviderError>;

    async fn poll_endpoint(
        &self,
        runtime_id: &str,
        name: &str,
    ) -> Result<EndpointStatus, ProviderError>;

    async fn start_delete_endpoint(&self, runtime_id: &str, name: &str)
        -> Result<(), ProviderError>;

    /// Implementations report `Deleted` when the endpoint no longer exists.
    async fn poll_endpoint_deletion(
        &self,
        runtime_id: &str,
        name: &str,
    ) -> Result<DeletionStatus, ProviderError>;

    async fn start_delete_runtime(&self, runtime_id: &str) -> Result<(), ProviderError>;

    /// Implementations report `Deleted` when the runtime no longer exists.
    async fn poll_runtime_deletion(&self, runtime_id: &str)
        -> Result<DeletionStatus, ProviderError>;

    async fn start_delete_memory(&self, memory_id: &str) -> Result<(), ProviderError>;

    /// Implementations report `Deleted` when the memory no longer exists.
    async fn poll_memory_deletion(&self, memory_id: &str)
        -> Result<DeletionStatus, ProviderError>;
}
