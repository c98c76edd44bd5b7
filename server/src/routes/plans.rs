//! Plan endpoint routes.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{
        header::{CACHE_CONTROL, ETAG, IF_NONE_MATCH, LOCATION},
        HeaderMap, StatusCode,
    },
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use plan_engine::ChangeToken;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::handlers::{
    handle_cost, handle_create, handle_delete, handle_list, handle_read, handle_replace,
    CostQuery, CostResponse, CreatedResponse, ListQuery, ListResponse, PlanRead,
};
use crate::AppState;

/// Create plan routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/plans", get(list_handler).post(create_handler))
        .route(
            "/plans/{id}",
            get(read_handler).put(replace_handler).delete(delete_handler),
        )
        .route("/plans/{id}/cost", get(cost_handler))
}

fn body(payload: std::result::Result<Json<Value>, JsonRejection>) -> Result<Value> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

/// POST /plans - Create a plan; 409 if its objectId is taken.
async fn create_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Response> {
    let (id, receipt) = handle_create(&state.store, body(payload)?)?;

    Ok((
        StatusCode::CREATED,
        [
            (ETAG, receipt.change_token.to_header()),
            (LOCATION, format!("/api/v1/plans/{id}")),
        ],
        Json(CreatedResponse {
            message: "Resource created successfully".to_string(),
            id,
            version: receipt.version,
            timestamp: Utc::now(),
        }),
    )
        .into_response())
}

/// PUT /plans/{id} - Create or replace a plan.
async fn replace_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Response> {
    let receipt = handle_replace(&state.store, &id, body(payload)?)?;
    let status = if receipt.version == 1 {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        [(ETAG, receipt.change_token.to_header())],
        Json(receipt),
    )
        .into_response())
}

/// GET /plans/{id} - Read a plan; honours If-None-Match.
async fn read_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response> {
    let if_none_match = headers
        .get(IF_NONE_MATCH)
        .and_then(|value| value.to_str().ok())
        .map(ChangeToken::from_header);

    let response = match handle_read(&state.store, &id, if_none_match.as_ref())? {
        PlanRead::NotModified(token) => {
            (StatusCode::NOT_MODIFIED, [(ETAG, token.to_header())]).into_response()
        }
        PlanRead::Found { body, change_token } => (
            StatusCode::OK,
            [
                (ETAG, change_token.to_header()),
                (CACHE_CONTROL, "max-age=3600".to_string()),
            ],
            Json(body),
        )
            .into_response(),
    };

    Ok(response)
}

/// DELETE /plans/{id} - Delete a plan.
async fn delete_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    handle_delete(&state.store, &id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /plans - List plan summaries.
async fn list_handler(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    let response: ListResponse = handle_list(&state.store, query);
    ([(CACHE_CONTROL, "max-age=300")], Json(response))
}

/// GET /plans/{id}/cost - Cost split for one service of a plan.
async fn cost_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    query: std::result::Result<Query<CostQuery>, QueryRejection>,
) -> Result<Json<CostResponse>> {
    let Query(query) = query.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    let response = handle_cost(&state.store, &id, query)?;
    Ok(Json(response))
}
