// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Lifecycle error taxonomy.
//!
//! `ConcurrentModification`, `VersionNotFound`, `QualifierNotFound`,
//! `AgentNotFound` and `ProtectedResource` are caller errors, returned
//! synchronously for the caller to retry with fresh state. `ProviderFailure`
//! and `Timeout` are terminal for the workflow instance that hit them;
//! retrying the same idempotent workflow is the recovery path.

use std::time::Duration;
use thiserror::Error;

use crate::domain::agent::ConfigurationError;
use crate::domain::provider::ProviderError;
use crate::domain::registry::RegistryError;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("remote provider reported a failure: {0}")]
    ProviderFailure(String),

    #[error("{operation} did not settle within {ceiling:?}")]
    Timeout { operation: String, ceiling: Duration },

    #[error("agent {0} was modified concurrently; re-fetch and retry")]
    ConcurrentModification(String),

    #[error("agent {agent_name} has no version {runtime_version}")]
    VersionNotFound {
        agent_name: String,
        runtime_version: u32,
    },

    #[error("agent {agent_name} has no qualifier {qualifier}")]
    QualifierNotFound {
        agent_name: String,
        qualifier: String,
    },

    #[error("agent {0} not found")]
    AgentNotFound(String),

    #[error("qualifier {0} is protected and cannot be deleted")]
    ProtectedResource(String),

    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Registry(RegistryError),
}

impl From<RegistryError> for LifecycleError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::ConcurrentModification { agent_name, .. } => {
                LifecycleError::ConcurrentModification(agent_name)
            }
            other => LifecycleError::Registry(other),
        }
    }
}

impl From<ProviderError> for LifecycleError {
    fn from(err: ProviderError) -> Self {
        LifecycleError::ProviderFailure(err.to_string())
    }
}
