//! Savings API endpoints.

use api_types::{
    ApiResponse, ListQuery,
    saving::{SavingNew, SavingUpdate, SavingView},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::Principal;

use crate::{ServerError, page_from, server::ServerState};

pub async fn create(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Json(payload): Json<SavingNew>,
) -> Result<(StatusCode, Json<ApiResponse<SavingView>>), ServerError> {
    let saving = state
        .engine
        .create_saving(
            &principal,
            engine::NewSaving {
                amount: payload.amount,
                current_amount: payload.current_amount,
                target_date: payload.target_date,
                duration_months: payload.duration_months,
                description: payload.description,
            },
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("saving created", SavingView::from(saving))),
    ))
}

pub async fn list(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<SavingView>>>, ServerError> {
    let savings = state.engine.savings(&principal, page_from(&query)).await?;
    let views = savings.into_iter().map(SavingView::from).collect();
    Ok(Json(ApiResponse::ok("savings", views)))
}

pub async fn get_one(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<SavingView>>, ServerError> {
    let saving = state.engine.saving(&principal, id).await?;
    Ok(Json(ApiResponse::ok("saving", SavingView::from(saving))))
}

pub async fn update(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<SavingUpdate>,
) -> Result<Json<ApiResponse<SavingView>>, ServerError> {
    let saving = state
        .engine
        .update_saving(
            &principal,
            id,
            engine::SavingUpdate {
                amount: payload.amount,
                current_amount: payload.current_amount,
                target_date: payload.target_date,
                duration_months: payload.duration_months,
                description: payload.description,
                is_completed: payload.is_completed,
            },
        )
        .await?;
    Ok(Json(ApiResponse::ok("saving updated", SavingView::from(saving))))
}

pub async fn remove(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_saving(&principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
