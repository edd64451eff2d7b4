// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Registry records: version history and the per-agent summary.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The endpoint alias that always points at the latest version.
/// It can be repointed but never deleted.
pub const DEFAULT_QUALIFIER: &str = "DEFAULT";

/// Mapping from endpoint alias (qualifier) to the runtime version it serves.
pub type QualifierMap = BTreeMap<String, u32>;

/// One registry row per (agent name, created_at). Immutable once written;
/// `created_at` is the content-derived key from
/// [`crate::domain::agent::AgentConfiguration::content_timestamp`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgentVersionRecord {
    pub agent_name: String,
    pub created_at: i64,
    pub runtime_arn: String,
    pub runtime_id: String,
    pub runtime_version: u32,
    /// Serialized enriched configuration.
    pub configuration_value: String,
}

/// One summary row per agent name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgentSummaryRecord {
    pub agent_name: String,
    pub runtime_arn: String,
    pub runtime_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    pub number_of_versions: u32,
    pub qualifier_to_version: QualifierMap,
}

impl AgentSummaryRecord {
    /// Summary row created alongside the first version of an agent.
    pub fn first_version(version_record: &AgentVersionRecord) -> Self {
        let mut qualifier_to_version = QualifierMap::new();
        qualifier_to_version.insert(
            DEFAULT_QUALIFIER.to_string(),
            version_record.runtime_version,
        );

        Self {
            agent_name: version_record.agent_name.clone(),
            runtime_arn: version_record.runtime_arn.clone(),
            runtime_id: version_record.runtime_id.clone(),
            description: None,
            created_at: version_record.created_at,
            owner: None,
            number_of_versions: 1,
            qualifier_to_version,
        }
    }

    /// Append a freshly created version: bump the counter and repoint DEFAULT.
    pub fn record_version(&mut self, runtime_version: u32) {
        self.number_of_versions += 1;
        self.qualifier_to_version
            .insert(DEFAULT_QUALIFIER.to_string(), runtime_version);
    }

    /// Point `qualifier` at `runtime_version`, creating the entry if needed.
    pub fn set_qualifier(&mut self, qualifier: &str, runtime_version: u32) {
        self.qualifier_to_version
            .insert(qualifier.to_string(), runtime_version);
    }

    /// Remove a qualifier from the map. DEFAULT is protected and is never
    /// removed; returns whether an entry was actually dropped.
    pub fn remove_qualifier(&mut self, qualifier: &str) -> bool {
        if qualifier == DEFAULT_QUALIFIER {
            return false;
        }
        self.qualifier_to_version.remove(qualifier).is_some()
    }
}
