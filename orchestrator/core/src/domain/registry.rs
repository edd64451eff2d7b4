// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Runtime Registry contract.
//!
//! The registry is the local source of truth for version history and the
//! qualifier map. It is the only shared mutable state in the system, so all
//! summary mutations go through a revision-gated compare-and-swap; version
//! records are write-once and immutable.
//!
//! Interface defined here in the domain layer, implemented in
//! `crate::infrastructure::registry`.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::records::{AgentSummaryRecord, AgentVersionRecord};

/// Outcome of a version write. A duplicate `(agent_name, created_at)` key is
/// an idempotent no-op, never an error: the key is content-derived, so a
/// duplicate means the same configuration was submitted again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutVersion {
    Inserted,
    AlreadyExists,
}

/// Summary record paired with the revision to present on the next CAS.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionedSummary {
    pub revision: u64,
    pub summary: AgentSummaryRecord,
}

/// Mutator applied inside a conditional summary upsert. Receives the current
/// record (None when absent) and returns the record to store.
pub type SummaryMutator =
    Box<dyn FnOnce(Option<AgentSummaryRecord>) -> AgentSummaryRecord + Send>;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("summary for agent {agent_name} was modified concurrently (expected revision {expected:?})")]
    ConcurrentModification {
        agent_name: String,
        expected: Option<u64>,
    },

    #[error("storage error: {0}")]
    Storage(String),
}

/// Versioned key-value store for agent runtime bookkeeping.
#[async_trait]
pub trait RuntimeRegistry: Send + Sync {
    /// Write-once version record; duplicate keys report `AlreadyExists`.
    async fn put_version(&self, record: &AgentVersionRecord) -> Result<PutVersion, RegistryError>;

    /// Primary-key lookup of a version record.
    async fn get_version(
        &self,
        agent_name: &str,
        created_at: i64,
    ) -> Result<Option<AgentVersionRecord>, RegistryError>;

    /// Secondary-index lookup by runtime version number.
    async fn find_version(
        &self,
        agent_name: &str,
        runtime_version: u32,
    ) -> Result<Option<AgentVersionRecord>, RegistryError>;

    /// All version records for an agent. No ordering guarantee; callers sort
    /// by `created_at` when they need an order.
    async fn list_versions(&self, agent_name: &str)
        -> Result<Vec<AgentVersionRecord>, RegistryError>;

    async fn get_summary(
        &self,
        agent_name: &str,
    ) -> Result<Option<VersionedSummary>, RegistryError>;

    /// All summary records.
    async fn list_summaries(&self) -> Result<Vec<AgentSummaryRecord>, RegistryError>;

    /// Atomic read-modify-write of the summary, gated on `expected_revision`
    /// (`None` = the record must not exist yet). Fails with
    /// [`RegistryError::ConcurrentModification`] when the precondition does
    /// not hold; the caller retries with fresh state.
    async fn upsert_summary(
        &self,
        agent_name: &str,
        expected_revision: Option<u64>,
        apply: SummaryMutator,
    ) -> Result<VersionedSummary, RegistryError>;

    /// Remove every version record for the agent; returns the count removed.
    async fn delete_all_versions(&self, agent_name: &str) -> Result<usize, RegistryError>;

    async fn delete_summary(&self, agent_name: &str) -> Result<(), RegistryError>;
}
