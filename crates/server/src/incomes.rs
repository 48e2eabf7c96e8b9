//! Income API endpoints.

use api_types::{
    ApiResponse, ListQuery,
    income::{IncomeNew, IncomeUpdate, IncomeView},
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
    Json(payload): Json<IncomeNew>,
) -> Result<(StatusCode, Json<ApiResponse<IncomeView>>), ServerError> {
    let income = state
        .engine
        .create_income(
            &principal,
            engine::NewIncome {
                amount: payload.amount,
                source: payload.source,
                date: payload.date,
            },
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("income created", IncomeView::from(income))),
    ))
}

pub async fn list(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<IncomeView>>>, ServerError> {
    let incomes = state.engine.incomes(&principal, page_from(&query)).await?;
    let views = incomes.into_iter().map(IncomeView::from).collect();
    Ok(Json(ApiResponse::ok("incomes", views)))
}

pub async fn get_one(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<IncomeView>>, ServerError> {
    let income = state.engine.income(&principal, id).await?;
    Ok(Json(ApiResponse::ok("income", IncomeView::from(income))))
}

pub async fn by_source(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(source): Path<String>,
) -> Result<Json<ApiResponse<Vec<IncomeView>>>, ServerError> {
    let incomes = state.engine.incomes_by_source(&principal, &source).await?;
    let views = incomes.into_iter().map(IncomeView::from).collect();
    Ok(Json(ApiResponse::ok("incomes", views)))
}

pub async fn update(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<IncomeUpdate>,
) -> Result<Json<ApiResponse<IncomeView>>, ServerError> {
    let income = state
        .engine
        .update_income(
            &principal,
            id,
            engine::IncomeUpdate {
                amount: payload.amount,
                source: payload.source,
                date: payload.date,
            },
        )
        .await?;
    Ok(Json(ApiResponse::ok("income updated", IncomeView::from(income))))
}

pub async fn remove(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_income(&principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
