//! Handlers for guest flow workflows.
//!
//! Graphs are validated with [`WorkflowGraph::validate`] before every write,
//! so stored workflows can be walked by clients without further checks.

use std::str::FromStr;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use gaestefotos_core::error::CoreError;
use gaestefotos_core::types::DbId;
use gaestefotos_core::workflow::{FlowType, WorkflowGraph, WorkflowNode};
use gaestefotos_db::models::workflow::{CreateWorkflow, UpdateWorkflow, Workflow};
use gaestefotos_db::repositories::WorkflowRepo;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

fn workflow_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Workflow", id })
}

fn parse_flow_type(raw: &str) -> AppResult<FlowType> {
    FlowType::from_str(raw).map_err(|e| AppError::Core(CoreError::Validation(e)))
}

fn check_graph(nodes: &serde_json::Value, edges: &serde_json::Value) -> AppResult<WorkflowGraph> {
    let graph = WorkflowGraph::from_json(nodes, edges)
        .map_err(|e| AppError::Core(CoreError::Validation(e)))?;
    graph
        .validate()
        .map_err(|errors| AppError::Core(CoreError::Validation(errors.join("; "))))?;
    Ok(graph)
}

// ---------------------------------------------------------------------------
// Public
// ---------------------------------------------------------------------------

/// GET /api/v1/workflows/by-type/{type}
pub async fn get_default_workflow(
    State(state): State<AppState>,
    Path(raw_type): Path<String>,
) -> AppResult<Json<DataResponse<Workflow>>> {
    let flow_type = parse_flow_type(&raw_type)?;
    let workflow = WorkflowRepo::find_default(&state.pool, flow_type.as_str())
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFoundByKey {
                entity: "Default workflow",
                key: flow_type.as_str().to_string(),
            })
        })?;
    Ok(Json(DataResponse { data: workflow }))
}

#[derive(Debug, Deserialize)]
pub struct NextQuery {
    /// Current node id. Absent means "where does the flow start".
    pub from: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NextStep {
    pub node: WorkflowNode,
    pub condition: Option<String>,
}

/// GET /api/v1/workflows/{id}/next?from=<node_id>
pub async fn next_steps(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(query): Query<NextQuery>,
) -> AppResult<Json<DataResponse<Vec<NextStep>>>> {
    let workflow = WorkflowRepo::find_by_id(&state.pool, id)
        .await?
        .filter(|w| w.is_active)
        .ok_or_else(|| workflow_not_found(id))?;
    let graph = WorkflowGraph::from_json(&workflow.nodes, &workflow.edges)
        .map_err(|e| AppError::InternalError(format!("Stored workflow {id} is invalid: {e}")))?;

    let steps = match query.from.as_deref() {
        None => graph
            .start_node()
            .map(|node| NextStep {
                node: node.clone(),
                condition: None,
            })
            .into_iter()
            .collect(),
        Some(from) => graph
            .next_nodes(from)
            .ok_or_else(|| {
                AppError::Core(CoreError::NotFoundByKey {
                    entity: "Workflow node",
                    key: from.to_string(),
                })
            })?
            .into_iter()
            .map(|(node, condition)| NextStep {
                node: node.clone(),
                condition: condition.map(str::to_string),
            })
            .collect(),
    };
    Ok(Json(DataResponse { data: steps }))
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct WorkflowListQuery {
    #[serde(rename = "type")]
    pub flow_type: Option<String>,
}

/// GET /api/v1/admin/workflows
pub async fn list_workflows(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<WorkflowListQuery>,
) -> AppResult<Json<DataResponse<Vec<Workflow>>>> {
    let flow_type = query.flow_type.as_deref().map(parse_flow_type).transpose()?;
    let workflows = WorkflowRepo::list(&state.pool, flow_type.map(FlowType::as_str)).await?;
    Ok(Json(DataResponse { data: workflows }))
}

/// GET /api/v1/admin/workflows/{id}
pub async fn get_workflow(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Workflow>>> {
    let workflow = WorkflowRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| workflow_not_found(id))?;
    Ok(Json(DataResponse { data: workflow }))
}

/// POST /api/v1/admin/workflows
pub async fn create_workflow(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateWorkflow>,
) -> AppResult<(StatusCode, Json<DataResponse<Workflow>>)> {
    input.validate()?;
    let flow_type = parse_flow_type(&input.flow_type)?;
    check_graph(&input.nodes, &input.edges)?;

    let workflow = WorkflowRepo::create(&state.pool, flow_type.as_str(), &input).await?;
    tracing::info!(
        workflow_id = workflow.id,
        flow_type = %flow_type,
        user_id = admin.user_id,
        "Workflow created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: workflow })))
}

/// PUT /api/v1/admin/workflows/{id}
///
/// A partial graph update is validated together with the stored half.
pub async fn update_workflow(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateWorkflow>,
) -> AppResult<Json<DataResponse<Workflow>>> {
    input.validate()?;
    let current = WorkflowRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| workflow_not_found(id))?;

    if input.nodes.is_some() || input.edges.is_some() {
        check_graph(
            input.nodes.as_ref().unwrap_or(&current.nodes),
            input.edges.as_ref().unwrap_or(&current.edges),
        )?;
    }
    if current.is_default && input.is_active == Some(false) {
        return Err(AppError::Core(CoreError::Conflict(
            "The default workflow of a type cannot be deactivated".into(),
        )));
    }

    let workflow = WorkflowRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| workflow_not_found(id))?;
    tracing::info!(workflow_id = id, user_id = admin.user_id, "Workflow updated");
    Ok(Json(DataResponse { data: workflow }))
}

/// DELETE /api/v1/admin/workflows/{id}
pub async fn delete_workflow(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let current = WorkflowRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| workflow_not_found(id))?;
    if current.is_default {
        return Err(AppError::Core(CoreError::Conflict(
            "Set another default before deleting this workflow".into(),
        )));
    }
    if !WorkflowRepo::delete(&state.pool, id).await? {
        return Err(workflow_not_found(id));
    }
    tracing::info!(workflow_id = id, user_id = admin.user_id, "Workflow deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/admin/workflows/{id}/set-default
pub async fn set_default_workflow(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Workflow>>> {
    let current = WorkflowRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| workflow_not_found(id))?;
    if !current.is_active {
        return Err(AppError::Core(CoreError::Conflict(
            "An inactive workflow cannot be the default".into(),
        )));
    }

    let workflow = WorkflowRepo::set_default(&state.pool, id)
        .await?
        .ok_or_else(|| workflow_not_found(id))?;
    tracing::info!(
        workflow_id = id,
        flow_type = %workflow.flow_type,
        user_id = admin.user_id,
        "Default workflow changed",
    );
    Ok(Json(DataResponse { data: workflow }))
}
