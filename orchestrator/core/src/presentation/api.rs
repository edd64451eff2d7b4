// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! HTTP API for the lifecycle orchestrator.
//!
//! Thin axum layer over [`RuntimeLifecycleService`]: every handler
//! deserializes, delegates and maps the error taxonomy to a status code.
//! Lifecycle events stream out over SSE per agent.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{sse, IntoResponse, Response, Sse},
    routing::{delete, get, post},
    Json, Router,
};
use futures::stream::Stream;
use serde::Deserialize;
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::application::lifecycle::RuntimeLifecycleService;
use crate::domain::agent::AgentConfiguration;
use crate::domain::error::LifecycleError;
use crate::domain::records::QualifierMap;
use crate::infrastructure::notifier::BroadcastNotifier;

pub struct AppState {
    pub service: Arc<RuntimeLifecycleService>,
    pub notifier: BroadcastNotifier,
}

pub fn app(service: Arc<RuntimeLifecycleService>, notifier: BroadcastNotifier) -> Router {
    let state = Arc::new(AppState { service, notifier });

    Router::new()
        .route("/agents", get(list_agents))
        .route("/agents/{name}/runtime", post(create_or_update))
        .route("/agents/{name}/tags", post(tag_version))
        .route(
            "/agents/{name}/runtime/{runtime_id}",
            delete(delete_runtime),
        )
        .route(
            "/agents/{name}/runtime/{runtime_id}/endpoints",
            get(list_endpoints).delete(delete_endpoints),
        )
        .route("/agents/{name}/versions", get(list_versions))
        .route("/agents/{name}/configuration", get(get_configuration))
        .route("/agents/{name}/events", get(stream_events))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Error envelope with the lifecycle taxonomy mapped to HTTP status codes.
struct ApiError(LifecycleError);

impl From<LifecycleError> for ApiError {
    fn from(err: LifecycleError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            LifecycleError::ConcurrentModification(_) | LifecycleError::ProtectedResource(_) => {
                StatusCode::CONFLICT
            }
            LifecycleError::AgentNotFound(_)
            | LifecycleError::VersionNotFound { .. }
            | LifecycleError::QualifierNotFound { .. } => StatusCode::NOT_FOUND,
            LifecycleError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            LifecycleError::ProviderFailure(_) => StatusCode::BAD_GATEWAY,
            LifecycleError::Configuration(_) => StatusCode::BAD_REQUEST,
            LifecycleError::Registry(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

async fn list_agents(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let agents = state.service.list_agents().await?;
    Ok(Json(json!({ "agents": agents })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateOrUpdateRequest {
    configuration: AgentConfiguration,
    knowledge_base_id: Option<String>,
}

async fn create_or_update(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(request): Json<CreateOrUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let created = state
        .service
        .create_or_update(
            &name,
            request.configuration,
            request.knowledge_base_id.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(created_json(&created))))
}

fn created_json(created: &crate::application::lifecycle::CreatedVersion) -> serde_json::Value {
    json!({
        "runtimeId": created.runtime_id,
        "runtimeArn": created.runtime_arn,
        "runtimeVersion": created.runtime_version,
        "createdAt": created.created_at,
    })
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TagVersionRequest {
    current_qualifier_to_version: QualifierMap,
    target_version: u32,
    qualifier: String,
    description: Option<String>,
}

async fn tag_version(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(request): Json<TagVersionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .service
        .tag_version(
            &name,
            &request.current_qualifier_to_version,
            request.target_version,
            &request.qualifier,
            request.description.as_deref(),
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_runtime(
    State(state): State<Arc<AppState>>,
    Path((name, runtime_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    state.service.delete_runtime(&name, &runtime_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
struct DeleteEndpointsRequest {
    endpoints: Vec<String>,
}

async fn delete_endpoints(
    State(state): State<Arc<AppState>>,
    Path((name, runtime_id)): Path<(String, String)>,
    Json(request): Json<DeleteEndpointsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .service
        .delete_endpoints(&name, &runtime_id, &request.endpoints)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_endpoints(
    State(state): State<Arc<AppState>>,
    Path((name, runtime_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let endpoints = state
        .service
        .list_runtime_endpoints(&name, &runtime_id)
        .await?;
    Ok(Json(json!({ "endpoints": endpoints })))
}

async fn list_versions(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let versions = state.service.list_versions(&name).await?;
    Ok(Json(json!({ "versions": versions })))
}

#[derive(Deserialize)]
struct ConfigurationQuery {
    version: Option<u32>,
    qualifier: Option<String>,
}

/// Configuration lookup by explicit version, by qualifier, or DEFAULT when
/// neither is given.
async fn get_configuration(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Query(query): Query<ConfigurationQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let configuration = match (query.version, query.qualifier) {
        (Some(version), _) => {
            state
                .service
                .get_configuration_by_version(&name, version)
                .await?
        }
        (None, Some(qualifier)) => {
            state
                .service
                .get_configuration_by_qualifier(&name, &qualifier)
                .await?
        }
        (None, None) => state.service.get_default_configuration(&name).await?,
    };

    // stored as a JSON string; hand it back as a JSON document
    let value: serde_json::Value = serde_json::from_str(&configuration)
        .unwrap_or_else(|_| serde_json::Value::String(configuration));
    Ok(Json(json!({ "configuration": value })))
}

async fn stream_events(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Sse<impl Stream<Item = Result<sse::Event, Infallible>>> {
    let receiver = state.notifier.subscribe_agent(name);

    let stream = futures::stream::unfold(receiver, |mut receiver| async move {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    let data = serde_json::to_string(&event).unwrap_or_default();
                    return Some((Ok(sse::Event::default().data(data)), receiver));
                }
                // dropped events are not replayed; keep streaming from now
                Err(crate::infrastructure::notifier::NotifierError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    });

    Sse::new(stream).keep_alive(sse::KeepAlive::default())
}
