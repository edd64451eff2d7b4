// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! In-Memory Runtime Registry
//!
//! HashMap-backed implementation of [`RuntimeRegistry`]. Both tables live
//! behind one `RwLock` so a summary CAS and its revision read are atomic
//! with respect to each other.
//!
//! For MVP: in-memory only (registry lost on restart)

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::domain::records::{AgentSummaryRecord, AgentVersionRecord};
use crate::domain::registry::{
    PutVersion, RegistryError, RuntimeRegistry, SummaryMutator, VersionedSummary,
};

#[derive(Default)]
struct Tables {
    /// Version records keyed by `(agent_name, created_at)`. Write-once.
    versions: HashMap<(String, i64), AgentVersionRecord>,
    /// Summary records with their current CAS revision.
    summaries: HashMap<String, (u64, AgentSummaryRecord)>,
}

#[derive(Clone, Default)]
pub struct InMemoryRuntimeRegistry {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryRuntimeRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RuntimeRegistry for InMemoryRuntimeRegistry {
    async fn put_version(&self, record: &AgentVersionRecord) -> Result<PutVersion, RegistryError> {
        let mut tables = self.tables.write().unwrap();
        let key = (record.agent_name.clone(), record.created_at);
        if tables.versions.contains_key(&key) {
            return Ok(PutVersion::AlreadyExists);
        }
        tables.versions.insert(key, record.clone());
        Ok(PutVersion::Inserted)
    }

    async fn get_version(
        &self,
        agent_name: &str,
        created_at: i64,
    ) -> Result<Option<AgentVersionRecord>, RegistryError> {
        let tables = self.tables.read().unwrap();
        Ok(tables
            .versions
            .get(&(agent_name.to_string(), created_at))
            .cloned())
    }

    async fn find_version(
        &self,
        agent_name: &str,
        runtime_version: u32,
    ) -> Result<Option<AgentVersionRecord>, RegistryError> {
        let tables = self.tables.read().unwrap();
        Ok(tables
            .versions
            .values()
            .find(|record| {
                record.agent_name == agent_name && record.runtime_version == runtime_version
            })
            .cloned())
    }

    async fn list_versions(
        &self,
        agent_name: &str,
    ) -> Result<Vec<AgentVersionRecord>, RegistryError> {
        let tables = self.tables.read().unwrap();
        Ok(tables
            .versions
            .values()
            .filter(|record| record.agent_name == agent_name)
            .cloned()
            .collect())
    }

    async fn get_summary(
        &self,
        agent_name: &str,
    ) -> Result<Option<VersionedSummary>, RegistryError> {
        let tables = self.tables.read().unwrap();
        Ok(tables
            .summaries
            .get(agent_name)
            .map(|(revision, summary)| VersionedSummary {
                revision: *revision,
                summary: summary.clone(),
            }))
    }

    async fn list_summaries(&self) -> Result<Vec<AgentSummaryRecord>, RegistryError> {
        let tables = self.tables.read().unwrap();
        let mut summaries: Vec<AgentSummaryRecord> = tables
            .summaries
            .values()
            .map(|(_, summary)| summary.clone())
            .collect();
        summaries.sort_by(|a, b| a.agent_name.cmp(&b.agent_name));
        Ok(summaries)
    }

    async fn upsert_summary(
        &self,
        agent_name: &str,
        expected_revision: Option<u64>,
        apply: SummaryMutator,
    ) -> Result<VersionedSummary, RegistryError> {
        let mut tables = self.tables.write().unwrap();
        let current = tables.summaries.get(agent_name);

        // Revision gate first; the mutator only runs once the precondition
        // holds, so `apply(None)` implies `expected_revision` was `None`.
        let current_revision = current.map(|(revision, _)| *revision);
        if current_revision != expected_revision {
            return Err(RegistryError::ConcurrentModification {
                agent_name: agent_name.to_string(),
                expected: expected_revision,
            });
        }

        let existing = current.map(|(_, summary)| summary.clone());
        let next = apply(existing);
        let next_revision = current_revision.map_or(1, |revision| revision + 1);
        tables
            .summaries
            .insert(agent_name.to_string(), (next_revision, next.clone()));

        Ok(VersionedSummary {
            revision: next_revision,
            summary: next,
        })
    }

    async fn delete_all_versions(&self, agent_name: &str) -> Result<usize, RegistryError> {
        let mut tables = self.tables.write().unwrap();
        let before = tables.versions.len();
        tables.versions.retain(|(name, _), _| name != agent_name);
        Ok(before - tables.versions.len())
    }

    async fn delete_summary(&self, agent_name: &str) -> Result<(), RegistryError> {
        let mut tables = self.tables.write().unwrap();
        tables.summaries.remove(agent_name);
        Ok(())
    }
}
