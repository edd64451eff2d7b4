// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! HTTP Runtime Provider Adapter
//!
//! Maps the [`RuntimeProvider`] contract onto the control-plane REST API of
//! the remote runtime host.
//!
//! # Endpoint mapping
//!
//! ```text
//! POST   /runtimes                                    start create/update
//! GET    /runtimes/{id}?version={n}                   runtime status
//! GET    /runtimes/{id}                               runtime deletion status
//! DELETE /runtimes/{id}                               start runtime deletion
//! GET    /runtimes/{id}/endpoints                     list endpoints
//! POST   /runtimes/{id}/endpoints                     start endpoint creation
//! GET    /runtimes/{id}/endpoints/{name}              endpoint status
//! DELETE /runtimes/{id}/endpoints/{name}              start endpoint deletion
//! POST   /memories                                    start memory creation
//! GET    /memories/{id}                               memory status
//! DELETE /memories/{id}                               start memory deletion
//! GET    /memories?agentName={name}                   find agent memory
//! ```
//!
//! A 404 on a deletion poll means the resource is already gone and maps to
//! `DeletionStatus::Deleted`.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::domain::provider::{
    DeletionStatus, EndpointStatus, MemoryStatus, ProviderError, RuntimeCreateSpec,
    RuntimeEndpoint, RuntimeProvider, RuntimeStatus, StartedRuntime,
};
use crate::domain::records::DEFAULT_QUALIFIER;

pub struct HttpRuntimeProvider {
    base_url: String,
    client: Client,
}

#[derive(Deserialize)]
struct StatusBody<S> {
    status: S,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MemoryCreatedBody {
    memory_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MemoryLookupBody {
    memory_id: Option<String>,
}

#[derive(Deserialize)]
struct EndpointListBody {
    endpoints: Vec<RuntimeEndpoint>,
}

impl HttpRuntimeProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// 404 becomes `NotFound`, other non-success statuses become `Remote`
    /// with the response body attached.
    async fn check(response: Response) -> Result<Response, ProviderError> {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::NotFound(body));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Remote(format!("{status}: {body}")));
        }
        Ok(response)
    }

    async fn get_status<S: serde::de::DeserializeOwned>(
        &self,
        url: String,
    ) -> Result<S, ProviderError> {
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| ProviderError::Remote(err.to_string()))?;
        let body: StatusBody<S> = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|err| ProviderError::Remote(err.to_string()))?;
        Ok(body.status)
    }

    async fn start_delete(&self, url: String) -> Result<(), ProviderError> {
        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(|err| ProviderError::Remote(err.to_string()))?;
        Self::check(response).await?;
        Ok(())
    }

    async fn poll_deletion(&self, url: String) -> Result<DeletionStatus, ProviderError> {
        match self.get_status::<DeletionStatus>(url).await {
            Ok(status) => Ok(status),
            Err(ProviderError::NotFound(_)) => Ok(DeletionStatus::Deleted),
            Err(err) => Err(err),
        }
    }
}

#[async_trait]
impl RuntimeProvider for HttpRuntimeProvider {
    async fn start_create_or_update_runtime(
        &self,
        spec: RuntimeCreateSpec,
    ) -> Result<StartedRuntime, ProviderError> {
        debug!(agent_name = %spec.agent_name, "posting runtime create/update");
        let response = self
            .client
            .post(self.url("/runtimes"))
            .json(&spec)
            .send()
            .await
            .map_err(|err| ProviderError::Remote(err.to_string()))?;
        Self::check(response)
            .await?
            .json()
            .await
            .map_err(|err| ProviderError::Remote(err.to_string()))
    }

    async fn poll_runtime(
        &self,
        runtime_id: &str,
        runtime_version: u32,
    ) -> Result<RuntimeStatus, ProviderError> {
        self.get_status(self.url(&format!(
            "/runtimes/{runtime_id}?version={runtime_version}"
        )))
        .await
    }

    async fn start_create_memory(
        &self,
        name: &str,
        retention_days: u32,
    ) -> Result<String, ProviderError> {
        let response = self
            .client
            .post(self.url("/memories"))
            .json(&json!({ "name": name, "retentionDays": retention_days }))
            .send()
            .await
            .map_err(|err| ProviderError::Remote(err.to_string()))?;
        let body: MemoryCreatedBody = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|err| ProviderError::Remote(err.to_string()))?;
        Ok(body.memory_id)
    }

    async fn poll_memory(&self, memory_id: &str) -> Result<MemoryStatus, ProviderError> {
        self.get_status(self.url(&format!("/memories/{memory_id}")))
            .await
    }

    async fn find_memory(&self, agent_name: &str) -> Result<Option<String>, ProviderError> {
        let response = self
            .client
            .get(self.url(&format!("/memories?agentName={agent_name}")))
            .send()
            .await
            .map_err(|err| ProviderError::Remote(err.to_string()))?;
        match Self::check(response).await {
            Ok(response) => {
                let body: MemoryLookupBody = response
                    .json()
                    .await
                    .map_err(|err| ProviderError::Remote(err.to_string()))?;
                Ok(body.memory_id)
            }
            Err(ProviderError::NotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn list_endpoints(
        &self,
        runtime_id: &str,
    ) -> Result<Vec<RuntimeEndpoint>, ProviderError> {
        let response = self
            .client
            .get(self.url(&format!("/runtimes/{runtime_id}/endpoints")))
            .send()
            .await
            .map_err(|err| ProviderError::Remote(err.to_string()))?;
        let body: EndpointListBody = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|err| ProviderError::Remote(err.to_string()))?;
        // the contract promises non-DEFAULT endpoints only
        Ok(body
            .endpoints
            .into_iter()
            .filter(|endpoint| endpoint.name != DEFAULT_QUALIFIER)
            .collect())
    }

    async fn start_create_endpoint(
        &self,
        runtime_id: &str,
        name: &str,
        runtime_version: u32,
        description: Option<&str>,
    ) -> Result<(), ProviderError> {
        let response = self
            .client
            .post(self.url(&format!("/runtimes/{runtime_id}/endpoints")))
            .json(&json!({
                "name": name,
                "version": runtime_version,
                "description": description,
            }))
            .send()
            .await
            .map_err(|err| ProviderError::Remote(err.to_string()))?;
        Self::check(response).await?;
        Ok(())
    }

    async fn poll_endpoint(
        &self,
        runtime_id: &str,
        name: &str,
    ) -> Result<EndpointStatus, ProviderError> {
        self.get_status(self.url(&format!("/runtimes/{runtime_id}/endpoints/{name}")))
            .await
    }

    async fn start_delete_endpoint(
        &self,
        runtime_id: &str,
        name: &str,
    ) -> Result<(), ProviderError> {
        self.start_delete(self.url(&format!("/runtimes/{runtime_id}/endpoints/{name}")))
            .await
    }

    async fn poll_endpoint_deletion(
        &self,
        runtime_id: &str,
        name: &str,
    ) -> Result<DeletionStatus, ProviderError> {
        self.poll_deletion(self.url(&format!("/runtimes/{runtime_id}/endpoints/{name}")))
            .await
    }

    async fn start_delete_runtime(&self, runtime_id: &str) -> Result<(), ProviderError> {
        self.start_delete(self.url(&format!("/runtimes/{runtime_id}")))
            .await
    }

    async fn poll_runtime_deletion(
        &self,
        runtime_id: &str,
    ) -> Result<DeletionStatus, ProviderError> {
        self.poll_deletion(self.url(&format!("/runtimes/{runtime_id}")))
            .await
    }

    async fn start_delete_memory(&self, memory_id: &str) -> Result<(), ProviderError> {
        self.start_delete(self.url(&format!("/memories/{memory_id}")))
            .await
    }

    async fn poll_memory_deletion(
        &self,
        memory_id: &str,
    ) -> Result<DeletionStatus, ProviderError> {
        self.poll_deletion(self.url(&format!("/memories/{memory_id}")))
            .await
    }
}
