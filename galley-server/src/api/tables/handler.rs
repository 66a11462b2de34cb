//! Table API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::AppResult;
use shared::models::{
    DiningTableCreate, OpenSessionRequest, TableMergeRequest, TablePair, TableSession,
    TableWithSession,
};

use crate::api::validate;
use crate::auth::Operator;
use crate::core::ServerState;
use crate::lifecycle::{merge, table_flow};

const RESOURCE: &str = "table";

/// GET /api/tables - floor view: tables with their current sessions
pub async fn list(
    State(state): State<ServerState>,
    op: Operator,
) -> AppResult<Json<Vec<TableWithSession>>> {
    let tables = table_flow::list_tables(&state.db.pool, op.venue_id).await?;
    Ok(Json(tables))
}

/// POST /api/tables - add a table to the floor
pub async fn create(
    State(state): State<ServerState>,
    op: Operator,
    Json(payload): Json<DiningTableCreate>,
) -> AppResult<Json<TableWithSession>> {
    let created = table_flow::create_table(&state.db.pool, &op, payload).await?;

    state.broadcast_change(RESOURCE, "created", created.table.id, Some(&created));
    Ok(Json(created))
}

/// POST /api/tables/:id/session - seat a party
pub async fn open_session(
    State(state): State<ServerState>,
    op: Operator,
    Path(id): Path<i64>,
    Json(payload): Json<OpenSessionRequest>,
) -> AppResult<Json<TableSession>> {
    validate(&payload)?;
    let session = table_flow::open_session(&state.db.pool, &op, id, payload).await?;

    state.broadcast_change(RESOURCE, "updated", id, Some(&session));
    Ok(Json(session))
}

/// POST /api/tables/merge - combine two FREE tables
pub async fn merge(
    State(state): State<ServerState>,
    op: Operator,
    Json(payload): Json<TableMergeRequest>,
) -> AppResult<Json<TablePair>> {
    let pair = merge::merge_tables(
        &state.db.pool,
        &op,
        payload.primary_table_id,
        payload.secondary_table_id,
    )
    .await?;

    state.broadcast_change(RESOURCE, "updated", pair.primary.id, Some(&pair));
    Ok(Json(pair))
}

/// POST /api/tables/:id/unmerge - split a merge by its secondary table
pub async fn unmerge(
    State(state): State<ServerState>,
    op: Operator,
    Path(id): Path<i64>,
) -> AppResult<Json<TablePair>> {
    let pair = merge::unmerge_table(&state.db.pool, &op, id).await?;

    state.broadcast_change(RESOURCE, "updated", pair.primary.id, Some(&pair));
    Ok(Json(pair))
}
