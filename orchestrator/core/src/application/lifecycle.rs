// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Lifecycle Orchestrator Application Service
//!
//! Drives the three agent-runtime workflows as explicit async step
//! sequences, consuming the registry and the remote provider and publishing
//! a notification after every outcome.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Orchestrate runtime create/update, tagging and deletion
//! - **Dependencies:** Domain contracts (`RuntimeRegistry`, `RuntimeProvider`,
//!   `UpdateNotifier`)
//!
//! # Step sequences
//!
//! ```text
//! create/update: (memory check -> memory create wait)? -> runtime start
//!                -> runtime wait -> registry write -> notify
//! tag:           summary read + snapshot check -> version lookup
//!                -> (endpoint create wait)? -> summary CAS -> notify
//! delete:        list endpoints -> fan-out endpoint deletes (join)
//!                -> runtime delete wait -> memory delete wait?
//!                -> registry cleanup -> notify
//! ```
//!
//! Ordering rule for deletion: local bookkeeping is removed only after the
//! provider confirms the remote resources are gone, so a failed deletion
//! leaves the registry intact and a retry resumes from provider state.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::application::poll::{poll_until, PollOutcome, PollSettings};
use crate::domain::agent::{AgentConfiguration, ConfigurationError};
use crate::domain::error::LifecycleError;
use crate::domain::events::{RuntimeLifecycleEvent, UpdateNotifier, WorkflowKind};
use crate::domain::provider::{
    DeletionStatus, EndpointStatus, MemoryStatus, ProviderError, RuntimeCreateSpec,
    RuntimeEndpoint, RuntimeProvider, RuntimeStatus, StartedRuntime,
};
use crate::domain::records::{
    AgentSummaryRecord, AgentVersionRecord, QualifierMap, DEFAULT_QUALIFIER,
};
use crate::domain::registry::{PutVersion, RegistryError, RuntimeRegistry, SummaryMutator};
use crate::domain::service_config::OrchestratorConfig;

/// Attempts for the read-modify-CAS loops that may lose benign races.
const SUMMARY_CAS_ATTEMPTS: usize = 4;

/// Static parameters of the lifecycle workflows.
#[derive(Debug, Clone)]
pub struct LifecycleSettings {
    pub container_uri: String,
    pub execution_role_arn: String,
    pub memory_retention_days: u32,
    pub poll: PollSettings,
}

impl From<&OrchestratorConfig> for LifecycleSettings {
    fn from(config: &OrchestratorConfig) -> Self {
        Self {
            container_uri: config.container_uri.clone(),
            execution_role_arn: config.execution_role_arn.clone(),
            memory_retention_days: config.memory_retention_days,
            poll: PollSettings {
                interval: config.poll_interval,
                ceiling: config.poll_ceiling,
            },
        }
    }
}

/// Result of a successful create/update workflow.
#[derive(Debug, Clone)]
pub struct CreatedVersion {
    pub runtime_id: String,
    pub runtime_arn: String,
    pub runtime_version: u32,
    pub created_at: i64,
}

/// Lifecycle Orchestrator (Application Service).
///
/// Holds no locks and caches no provider state beyond one workflow
/// execution; the registry CAS is the only serialization point.
pub struct RuntimeLifecycleService {
    registry: Arc<dyn RuntimeRegistry>,
    provider: Arc<dyn RuntimeProvider>,
    notifier: Arc<dyn UpdateNotifier>,
    settings: LifecycleSettings,
}

impl RuntimeLifecycleService {
    pub fn new(
        registry: Arc<dyn RuntimeRegistry>,
        provider: Arc<dyn RuntimeProvider>,
        notifier: Arc<dyn UpdateNotifier>,
        settings: LifecycleSettings,
    ) -> Self {
        Self {
            registry,
            provider,
            notifier,
            settings,
        }
    }

    // ========================================================================
    // Create/Update workflow
    // ========================================================================

    /// Create a runtime for `agent_name`, or add a version to an existing
    /// one. Re-submitting an identical configuration is idempotent: the
    /// version key is derived from the configuration content.
    pub async fn create_or_update(
        &self,
        agent_name: &str,
        configuration: AgentConfiguration,
        knowledge_base_id: Option<&str>,
    ) -> Result<CreatedVersion, LifecycleError> {
        let result = self
            .run_create_or_update(agent_name, configuration, knowledge_base_id)
            .await;

        match &result {
            Ok(created) => self.notifier.publish(RuntimeLifecycleEvent::RuntimeUpdated {
                agent_name: agent_name.to_string(),
                runtime_version: created.runtime_version,
                occurred_at: Utc::now(),
            }),
            Err(err) => self.publish_failure(agent_name, WorkflowKind::CreateOrUpdate, err),
        }

        result
    }

    async fn run_create_or_update(
        &self,
        agent_name: &str,
        configuration: AgentConfiguration,
        knowledge_base_id: Option<&str>,
    ) -> Result<CreatedVersion, LifecycleError> {
        configuration.validate()?;

        // The version key hashes the base configuration; the stored value is
        // the enriched one. Keeps the key stable across knowledge-base
        // re-creation.
        let created_at = configuration.content_timestamp()?;
        let stored = match knowledge_base_id {
            Some(kb_id) => configuration.with_knowledge_base(kb_id),
            None => configuration.clone(),
        };

        let memory_id = if configuration.use_memory {
            Some(self.ensure_memory(agent_name).await?)
        } else {
            None
        };

        let mut environment = HashMap::new();
        environment.insert("agentName".to_string(), agent_name.to_string());
        environment.insert("createdAt".to_string(), created_at.to_string());
        if let Some(memory_id) = &memory_id {
            environment.insert("memoryId".to_string(), memory_id.clone());
        }

        let started = self
            .provider
            .start_create_or_update_runtime(RuntimeCreateSpec {
                agent_name: agent_name.to_string(),
                container_uri: self.settings.container_uri.clone(),
                execution_role_arn: self.settings.execution_role_arn.clone(),
                environment,
            })
            .await?;

        info!(
            agent_name,
            runtime_id = %started.runtime_id,
            runtime_version = started.runtime_version,
            "runtime create/update started"
        );

        self.wait_runtime_ready(&started).await?;

        let record = AgentVersionRecord {
            agent_name: agent_name.to_string(),
            created_at,
            runtime_arn: started.runtime_arn.clone(),
            runtime_id: started.runtime_id.clone(),
            runtime_version: started.runtime_version,
            configuration_value: serde_json::to_string(&stored)
                .map_err(|err| ConfigurationError::Serialization(err.to_string()))?,
        };

        match self.registry.put_version(&record).await? {
            PutVersion::Inserted => {
                self.apply_new_version_to_summary(&record).await?;
                Ok(CreatedVersion {
                    runtime_id: record.runtime_id,
                    runtime_arn: record.runtime_arn,
                    runtime_version: record.runtime_version,
                    created_at,
                })
            }
            PutVersion::AlreadyExists => {
                // Same configuration submitted again: the stored record wins
                // and the summary (version count, DEFAULT pointer) is left
                // untouched.
                debug!(agent_name, created_at, "configuration already versioned");
                let existing = self
                    .registry
                    .get_version(agent_name, created_at)
                    .await?
                    .unwrap_or(record);
                Ok(CreatedVersion {
                    runtime_id: existing.runtime_id,
                    runtime_arn: existing.runtime_arn,
                    runtime_version: existing.runtime_version,
                    created_at,
                })
            }
        }
    }

    async fn wait_runtime_ready(&self, started: &StartedRuntime) -> Result<(), LifecycleError> {
        let provider = Arc::clone(&self.provider);
        let runtime_id = started.runtime_id.clone();
        let runtime_version = started.runtime_version;

        poll_until(&self.settings.poll, "runtime creation", move || {
            let provider = Arc::clone(&provider);
            let runtime_id = runtime_id.clone();
            async move {
                match provider.poll_runtime(&runtime_id, runtime_version).await? {
                    RuntimeStatus::Ready => Ok(PollOutcome::Settled(())),
                    RuntimeStatus::Failed => Err(LifecycleError::ProviderFailure(format!(
                        "runtime {runtime_id} version {runtime_version} entered FAILED"
                    ))),
                    RuntimeStatus::Creating | RuntimeStatus::Updating => Ok(PollOutcome::Pending),
                }
            }
        })
        .await
    }

    /// Reuse the agent's memory resource if the provider already has one,
    /// otherwise create it and wait until it is active. Existence is checked
    /// live against the provider; a concurrent delete workflow may not see a
    /// creation that has not become visible yet.
    async fn ensure_memory(&self, agent_name: &str) -> Result<String, LifecycleError> {
        if let Some(memory_id) = self.provider.find_memory(agent_name).await? {
            debug!(agent_name, memory_id, "reusing existing memory resource");
            return Ok(memory_id);
        }

        let memory_name = format!("{agent_name}Memory");
        let memory_id = self
            .provider
            .start_create_memory(&memory_name, self.settings.memory_retention_days)
            .await?;
        info!(agent_name, memory_id, "memory creation started");

        let provider = Arc::clone(&self.provider);
        let poll_id = memory_id.clone();
        poll_until(&self.settings.poll, "memory creation", move || {
            let provider = Arc::clone(&provider);
            let memory_id = poll_id.clone();
            async move {
                match provider.poll_memory(&memory_id).await? {
                    MemoryStatus::Active => Ok(PollOutcome::Settled(())),
                    MemoryStatus::Creating => Ok(PollOutcome::Pending),
                    MemoryStatus::Failed => Err(LifecycleError::ProviderFailure(format!(
                        "memory {memory_id} entered FAILED"
                    ))),
                    MemoryStatus::Deleting | MemoryStatus::Deleted => {
                        Err(LifecycleError::ProviderFailure(format!(
                            "memory {memory_id} was deleted while awaiting activation"
                        )))
                    }
                }
            }
        })
        .await?;

        Ok(memory_id)
    }

    async fn apply_new_version_to_summary(
        &self,
        record: &AgentVersionRecord,
    ) -> Result<(), LifecycleError> {
        for _ in 0..SUMMARY_CAS_ATTEMPTS {
            let current = self.registry.get_summary(&record.agent_name).await?;
            let expected = current.as_ref().map(|versioned| versioned.revision);

            let record_for_apply = record.clone();
            let apply: SummaryMutator = Box::new(move |existing| match existing {
                None => AgentSummaryRecord::first_version(&record_for_apply),
                Some(mut summary) => {
                    summary.record_version(record_for_apply.runtime_version);
                    summary.runtime_arn = record_for_apply.runtime_arn.clone();
                    summary.runtime_id = record_for_apply.runtime_id.clone();
                    summary
                }
            });

            match self
                .registry
                .upsert_summary(&record.agent_name, expected, apply)
                .await
            {
                Ok(_) => return Ok(()),
                Err(RegistryError::ConcurrentModification { .. }) => continue,
                Err(other) => return Err(other.into()),
            }
        }

        Err(LifecycleError::ConcurrentModification(
            record.agent_name.to_string(),
        ))
    }

    // ========================================================================
    // Tag/Version workflow
    // ========================================================================

    /// Point `qualifier` at `target_version`. The caller supplies the
    /// qualifier map it based its decision on; a mismatch with the stored
    /// map fails with `ConcurrentModification` and is never retried here.
    /// Retagging DEFAULT is allowed (it is repointable, just not deletable).
    pub async fn tag_version(
        &self,
        agent_name: &str,
        current_qualifier_to_version: &QualifierMap,
        target_version: u32,
        qualifier: &str,
        description: Option<&str>,
    ) -> Result<(), LifecycleError> {
        let result = self
            .run_tag_version(
                agent_name,
                current_qualifier_to_version,
                target_version,
                qualifier,
                description,
            )
            .await;

        match &result {
            Ok(()) => self.notifier.publish(RuntimeLifecycleEvent::RuntimeUpdated {
                agent_name: agent_name.to_string(),
                runtime_version: target_version,
                occurred_at: Utc::now(),
            }),
            Err(err) => self.publish_failure(agent_name, WorkflowKind::TagVersion, err),
        }

        result
    }

    async fn run_tag_version(
        &self,
        agent_name: &str,
        current_qualifier_to_version: &QualifierMap,
        target_version: u32,
        qualifier: &str,
        description: Option<&str>,
    ) -> Result<(), LifecycleError> {
        let versioned = self
            .registry
            .get_summary(agent_name)
            .await?
            .ok_or_else(|| LifecycleError::AgentNotFound(agent_name.to_string()))?;

        if &versioned.summary.qualifier_to_version != current_qualifier_to_version {
            return Err(LifecycleError::ConcurrentModification(
                agent_name.to_string(),
            ));
        }

        if self
            .registry
            .find_version(agent_name, target_version)
            .await?
            .is_none()
        {
            return Err(LifecycleError::VersionNotFound {
                agent_name: agent_name.to_string(),
                runtime_version: target_version,
            });
        }

        let runtime_id = versioned.summary.runtime_id.clone();
        let is_new_qualifier = !versioned
            .summary
            .qualifier_to_version
            .contains_key(qualifier);

        if is_new_qualifier {
            self.provider
                .start_create_endpoint(&runtime_id, qualifier, target_version, description)
                .await?;
            self.wait_endpoint_ready(&runtime_id, qualifier).await?;
        } else {
            debug!(
                agent_name,
                qualifier, "qualifier already routed; provider converges out of band"
            );
        }

        let qualifier_owned = qualifier.to_string();
        let apply: SummaryMutator = Box::new(move |existing| {
            // the matching revision guarantees the summary read above still
            // exists
            let mut summary = existing.expect("summary present under matching revision");
            summary.set_qualifier(&qualifier_owned, target_version);
            summary
        });
        self.registry
            .upsert_summary(agent_name, Some(versioned.revision), apply)
            .await?;

        info!(agent_name, qualifier, target_version, "qualifier updated");
        Ok(())
    }

    async fn wait_endpoint_ready(
        &self,
        runtime_id: &str,
        endpoint: &str,
    ) -> Result<(), LifecycleError> {
        let provider = Arc::clone(&self.provider);
        let runtime_id = runtime_id.to_string();
        let endpoint = endpoint.to_string();

        poll_until(&self.settings.poll, "endpoint creation", move || {
            let provider = Arc::clone(&provider);
            let runtime_id = runtime_id.clone();
            let endpoint = endpoint.clone();
            async move {
                match provider.poll_endpoint(&runtime_id, &endpoint).await? {
                    EndpointStatus::Ready => Ok(PollOutcome::Settled(())),
                    EndpointStatus::Creating | EndpointStatus::Updating => {
                        Ok(PollOutcome::Pending)
                    }
                    other => Err(LifecycleError::ProviderFailure(format!(
                        "endpoint {endpoint} on runtime {runtime_id} entered {other:?} during creation"
                    ))),
                }
            }
        })
        .await
    }

    // ========================================================================
    // Delete workflows
    // ========================================================================

    /// Delete named endpoints of a runtime. Naming `DEFAULT` rejects the
    /// whole request before any endpoint is touched.
    pub async fn delete_endpoints(
        &self,
        agent_name: &str,
        runtime_id: &str,
        endpoint_names: &[String],
    ) -> Result<(), LifecycleError> {
        let result = self
            .run_delete_endpoints(agent_name, runtime_id, endpoint_names)
            .await;

        match &result {
            Ok(()) => self
                .notifier
                .publish(RuntimeLifecycleEvent::EndpointsDeleted {
                    agent_name: agent_name.to_string(),
                    endpoints: endpoint_names.to_vec(),
                    occurred_at: Utc::now(),
                }),
            Err(err) => self.publish_failure(agent_name, WorkflowKind::DeleteEndpoints, err),
        }

        result
    }

    async fn run_delete_endpoints(
        &self,
        agent_name: &str,
        runtime_id: &str,
        endpoint_names: &[String],
    ) -> Result<(), LifecycleError> {
        if let Some(protected) = endpoint_names
            .iter()
            .find(|name| name.as_str() == DEFAULT_QUALIFIER)
        {
            return Err(LifecycleError::ProtectedResource(protected.clone()));
        }

        // fan out; the join barrier means every deletion reached a terminal
        // state before failures are inspected
        let deletions = endpoint_names
            .iter()
            .map(|name| self.delete_one_endpoint(runtime_id, name));
        let results = join_all(deletions).await;
        results.into_iter().collect::<Result<Vec<()>, _>>()?;

        self.remove_qualifiers_from_summary(agent_name, endpoint_names)
            .await?;

        info!(agent_name, runtime_id, ?endpoint_names, "endpoints deleted");
        Ok(())
    }

    async fn delete_one_endpoint(
        &self,
        runtime_id: &str,
        endpoint: &str,
    ) -> Result<(), LifecycleError> {
        match self.provider.start_delete_endpoint(runtime_id, endpoint).await {
            Ok(()) => {}
            Err(ProviderError::NotFound(_)) => {
                debug!(runtime_id, endpoint, "endpoint already gone");
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        }

        let provider = Arc::clone(&self.provider);
        let runtime_id = runtime_id.to_string();
        let endpoint_owned = endpoint.to_string();

        poll_until(&self.settings.poll, "endpoint deletion", move || {
            let provider = Arc::clone(&provider);
            let runtime_id = runtime_id.clone();
            let endpoint = endpoint_owned.clone();
            async move {
                match provider.poll_endpoint_deletion(&runtime_id, &endpoint).await {
                    Ok(DeletionStatus::Deleted) => Ok(PollOutcome::Settled(())),
                    Ok(DeletionStatus::Deleting) => Ok(PollOutcome::Pending),
                    Ok(DeletionStatus::Failed) => Err(LifecycleError::ProviderFailure(format!(
                        "deletion of endpoint {endpoint} on runtime {runtime_id} failed"
                    ))),
                    Err(ProviderError::NotFound(_)) => Ok(PollOutcome::Settled(())),
                    Err(err) => Err(err.into()),
                }
            }
        })
        .await
    }

    async fn remove_qualifiers_from_summary(
        &self,
        agent_name: &str,
        endpoint_names: &[String],
    ) -> Result<(), LifecycleError> {
        for _ in 0..SUMMARY_CAS_ATTEMPTS {
            let Some(versioned) = self.registry.get_summary(agent_name).await? else {
                warn!(agent_name, "no summary to update after endpoint deletion");
                return Ok(());
            };

            let names = endpoint_names.to_vec();
            let apply: SummaryMutator = Box::new(move |existing| {
                let mut summary = existing.expect("summary present under matching revision");
                for name in &names {
                    summary.remove_qualifier(name);
                }
                summary
            });

            match self
                .registry
                .upsert_summary(agent_name, Some(versioned.revision), apply)
                .await
            {
                Ok(_) => return Ok(()),
                Err(RegistryError::ConcurrentModification { .. }) => continue,
                Err(other) => return Err(other.into()),
            }
        }

        Err(LifecycleError::ConcurrentModification(
            agent_name.to_string(),
        ))
    }

    /// Delete the entire runtime: endpoints, the runtime itself, its memory
    /// resource when one exists, then the registry rows. Registry cleanup
    /// happens last; a failure before provider confirmation leaves local
    /// state untouched for a retry.
    pub async fn delete_runtime(
        &self,
        agent_name: &str,
        runtime_id: &str,
    ) -> Result<(), LifecycleError> {
        let result = self.run_delete_runtime(agent_name, runtime_id).await;

        match &result {
            Ok(()) => self.notifier.publish(RuntimeLifecycleEvent::RuntimeDeleted {
                agent_name: agent_name.to_string(),
                occurred_at: Utc::now(),
            }),
            Err(err) => self.publish_failure(agent_name, WorkflowKind::DeleteRuntime, err),
        }

        result
    }

    async fn run_delete_runtime(
        &self,
        agent_name: &str,
        runtime_id: &str,
    ) -> Result<(), LifecycleError> {
        // A retry after a partial failure may find the runtime already gone
        // remotely while the registry rows are still waiting for cleanup.
        let endpoints = match self.provider.list_endpoints(runtime_id).await {
            Ok(endpoints) => endpoints,
            Err(ProviderError::NotFound(_)) => {
                debug!(runtime_id, "runtime already gone; no endpoints to delete");
                Vec::new()
            }
            Err(err) => return Err(err.into()),
        };
        let names: Vec<String> = endpoints
            .into_iter()
            .map(|endpoint| endpoint.name)
            .filter(|name| name != DEFAULT_QUALIFIER)
            .collect();

        let deletions = names
            .iter()
            .map(|name| self.delete_one_endpoint(runtime_id, name));
        let results = join_all(deletions).await;
        results.into_iter().collect::<Result<Vec<()>, _>>()?;

        match self.provider.start_delete_runtime(runtime_id).await {
            Ok(()) => {}
            Err(ProviderError::NotFound(_)) => debug!(runtime_id, "runtime already gone"),
            Err(err) => return Err(err.into()),
        }
        self.wait_runtime_deleted(runtime_id).await?;

        if let Some(memory_id) = self.provider.find_memory(agent_name).await? {
            match self.provider.start_delete_memory(&memory_id).await {
                Ok(()) => {}
                Err(ProviderError::NotFound(_)) => debug!(memory_id, "memory already gone"),
                Err(err) => return Err(err.into()),
            }
            self.wait_memory_deleted(&memory_id).await?;
        }

        let removed = self.registry.delete_all_versions(agent_name).await?;
        self.registry.delete_summary(agent_name).await?;

        info!(
            agent_name,
            runtime_id,
            versions_removed = removed,
            "runtime deleted and registry cleaned"
        );
        Ok(())
    }

    async fn wait_runtime_deleted(&self, runtime_id: &str) -> Result<(), LifecycleError> {
        let provider = Arc::clone(&self.provider);
        let runtime_id_owned = runtime_id.to_string();

        poll_until(&self.settings.poll, "runtime deletion", move || {
            let provider = Arc::clone(&provider);
            let runtime_id = runtime_id_owned.clone();
            async move {
                match provider.poll_runtime_deletion(&runtime_id).await {
                    Ok(DeletionStatus::Deleted) => Ok(PollOutcome::Settled(())),
                    Ok(DeletionStatus::Deleting) => Ok(PollOutcome::Pending),
                    Ok(DeletionStatus::Failed) => Err(LifecycleError::ProviderFailure(format!(
                        "deletion of runtime {runtime_id} failed"
                    ))),
                    Err(ProviderError::NotFound(_)) => Ok(PollOutcome::Settled(())),
                    Err(err) => Err(err.into()),
                }
            }
        })
        .await
    }

    async fn wait_memory_deleted(&self, memory_id: &str) -> Result<(), LifecycleError> {
        let provider = Arc::clone(&self.provider);
        let memory_id_owned = memory_id.to_string();

        poll_until(&self.settings.poll, "memory deletion", move || {
            let provider = Arc::clone(&provider);
            let memory_id = memory_id_owned.clone();
            async move {
                match provider.poll_memory_deletion(&memory_id).await {
                    Ok(DeletionStatus::Deleted) => Ok(PollOutcome::Settled(())),
                    Ok(DeletionStatus::Deleting) => Ok(PollOutcome::Pending),
                    Ok(DeletionStatus::Failed) => Err(LifecycleError::ProviderFailure(format!(
                        "deletion of memory {memory_id} failed"
                    ))),
                    Err(ProviderError::NotFound(_)) => Ok(PollOutcome::Settled(())),
                    Err(err) => Err(err.into()),
                }
            }
        })
        .await
    }

    // ========================================================================
    // Read operations
    // ========================================================================

    pub async fn list_agents(&self) -> Result<Vec<AgentSummaryRecord>, LifecycleError> {
        Ok(self.registry.list_summaries().await?)
    }

    /// Version history for an agent, ordered by creation key.
    pub async fn list_versions(
        &self,
        agent_name: &str,
    ) -> Result<Vec<AgentVersionRecord>, LifecycleError> {
        let mut versions = self.registry.list_versions(agent_name).await?;
        versions.sort_by_key(|record| record.created_at);
        Ok(versions)
    }

    /// Endpoints currently routable for a runtime, straight from the
    /// provider. DEFAULT is excluded by the provider contract.
    pub async fn list_runtime_endpoints(
        &self,
        agent_name: &str,
        runtime_id: &str,
    ) -> Result<Vec<RuntimeEndpoint>, LifecycleError> {
        match self.provider.list_endpoints(runtime_id).await {
            Ok(endpoints) => Ok(endpoints),
            Err(ProviderError::NotFound(_)) => {
                Err(LifecycleError::AgentNotFound(agent_name.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    pub async fn get_configuration_by_version(
        &self,
        agent_name: &str,
        runtime_version: u32,
    ) -> Result<String, LifecycleError> {
        let record = self
            .registry
            .find_version(agent_name, runtime_version)
            .await?
            .ok_or_else(|| LifecycleError::VersionNotFound {
                agent_name: agent_name.to_string(),
                runtime_version,
            })?;
        Ok(record.configuration_value)
    }

    pub async fn get_configuration_by_qualifier(
        &self,
        agent_name: &str,
        qualifier: &str,
    ) -> Result<String, LifecycleError> {
        let versioned = self
            .registry
            .get_summary(agent_name)
            .await?
            .ok_or_else(|| LifecycleError::AgentNotFound(agent_name.to_string()))?;

        let runtime_version = versioned
            .summary
            .qualifier_to_version
            .get(qualifier)
            .copied()
            .ok_or_else(|| LifecycleError::QualifierNotFound {
                agent_name: agent_name.to_string(),
                qualifier: qualifier.to_string(),
            })?;

        self.get_configuration_by_version(agent_name, runtime_version)
            .await
    }

    pub async fn get_default_configuration(
        &self,
        agent_name: &str,
    ) -> Result<String, LifecycleError> {
        self.get_configuration_by_qualifier(agent_name, DEFAULT_QUALIFIER)
            .await
    }

    // ========================================================================
    // Notification
    // ========================================================================

    fn publish_failure(&self, agent_name: &str, workflow: WorkflowKind, err: &LifecycleError) {
        warn!(agent_name, ?workflow, error = %err, "workflow failed");
        self.notifier.publish(RuntimeLifecycleEvent::WorkflowFailed {
            agent_name: agent_name.to_string(),
            workflow,
            reason: err.to_string(),
            occurred_at: Utc::now(),
        });
    }

    /// Poll ceiling currently in force, exposed for the API layer.
    pub fn poll_ceiling(&self) -> Duration {
        self.settings.poll.ceiling
    }
}
