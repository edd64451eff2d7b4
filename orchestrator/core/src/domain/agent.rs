// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Agent configuration model.
//!
//! The configuration is the payload versioned by the runtime registry. Its
//! serialized form travels to the remote runtime as-is; its canonical form is
//! hashed to derive the deterministic `created_at` version key, so two
//! submissions of the same configuration land on the same registry row.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use thiserror::Error;

/// Parameter slot that receives the knowledge-base id during enrichment.
pub const KNOWLEDGE_BASE_PARAMETER: &str = "knowledgeBaseId";

/// Model inference parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InferenceParameters {
    pub max_tokens: u32,
    pub temperature: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_sequences: Option<Vec<String>>,
}

/// Model selection plus its inference parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModelConfiguration {
    pub model_id: String,
    pub parameters: InferenceParameters,
}

/// Conversation history policy applied by the deployed runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationManager {
    Null,
    #[default]
    SlidingWindow,
    Summarizing,
}

/// Free-form parameters attached to a single tool.
pub type ToolParameters = BTreeMap<String, serde_json::Value>;

/// The full agent configuration submitted through the create/update workflow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgentConfiguration {
    #[serde(rename = "modelInferenceParameters")]
    pub model: ModelConfiguration,

    pub instructions: String,

    /// Names of the tools exposed to the agent.
    #[serde(default)]
    pub tools: Vec<String>,

    /// Per-tool parameters; every key must name a declared tool.
    #[serde(default)]
    pub tool_parameters: BTreeMap<String, ToolParameters>,

    /// MCP servers attached to the runtime.
    #[serde(default)]
    pub mcp_servers: Vec<String>,

    #[serde(default)]
    pub conversation_manager: ConversationManager,

    /// Whether a provider-managed memory resource is attached.
    #[serde(default)]
    pub use_memory: bool,
}

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("tool parameters reference undeclared tools: {0}")]
    UnknownToolParameters(String),

    #[error("configuration is not serializable: {0}")]
    Serialization(String),
}

impl AgentConfiguration {
    /// Validate internal consistency of the configuration.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let unknown: Vec<&str> = self
            .tool_parameters
            .keys()
            .filter(|key| !self.tools.iter().any(|tool| tool == *key))
            .map(String::as_str)
            .collect();

        if unknown.is_empty() {
            Ok(())
        } else {
            Err(ConfigurationError::UnknownToolParameters(unknown.join(", ")))
        }
    }

    /// Deterministic version key for this configuration.
    ///
    /// SHA-256 over the canonical JSON form (object keys sorted), truncated
    /// to a non-negative i64. Computed over the *base* configuration, before
    /// knowledge-base enrichment, so the key stays stable when the knowledge
    /// base behind an agent is re-created.
    pub fn content_timestamp(&self) -> Result<i64, ConfigurationError> {
        let value = serde_json::to_value(self)
            .map_err(|err| ConfigurationError::Serialization(err.to_string()))?;

        let mut canonical = String::new();
        write_canonical(&value, &mut canonical);

        let digest = Sha256::digest(canonical.as_bytes());
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);

        Ok(i64::from_be_bytes(prefix) & i64::MAX)
    }

    /// Return a copy enriched with the knowledge-base id.
    ///
    /// Injection targets every tool that already declares the
    /// `knowledgeBaseId` parameter slot; the enriched form is what gets
    /// stored and shipped, the base form is what gets hashed.
    pub fn with_knowledge_base(&self, knowledge_base_id: &str) -> AgentConfiguration {
        let mut enriched = self.clone();
        for parameters in enriched.tool_parameters.values_mut() {
            if parameters.contains_key(KNOWLEDGE_BASE_PARAMETER) {
                parameters.insert(
                    KNOWLEDGE_BASE_PARAMETER.to_string(),
                    serde_json::Value::String(knowledge_base_id.to_string()),
                );
            }
        }
        enriched
    }
}

fn write_canonical(value: &serde_json::Value, out: &mut String) {
    match value {
        serde_json::Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&serde_json::Value::String((*key).clone()).to_string());
                out.push(':');
                write_canonical(&map[*key], out);
            }
            out.push('}');
        }
        serde_json::Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        other => out.push_str(&other.to_string()),
    }
}
