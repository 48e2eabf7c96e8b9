//! Expense API endpoints.

use api_types::{
    ApiResponse, ListQuery,
    expense::{ExpenseNew, ExpenseTotal, ExpenseUpdate, ExpenseView},
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
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<ApiResponse<ExpenseView>>), ServerError> {
    let expense = state
        .engine
        .create_expense(
            &principal,
            engine::NewExpense {
                amount: payload.amount,
                category: payload.category,
                date: payload.date,
            },
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("expense created", ExpenseView::from(expense))),
    ))
}

pub async fn list(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<ExpenseView>>>, ServerError> {
    let expenses = state.engine.expenses(&principal, page_from(&query)).await?;
    let views = expenses.into_iter().map(ExpenseView::from).collect();
    Ok(Json(ApiResponse::ok("expenses", views)))
}

pub async fn get_one(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ExpenseView>>, ServerError> {
    let expense = state.engine.expense(&principal, id).await?;
    Ok(Json(ApiResponse::ok("expense", ExpenseView::from(expense))))
}

pub async fn total(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
) -> Result<Json<ApiResponse<ExpenseTotal>>, ServerError> {
    let total = state.engine.total_expenses(&principal).await?;
    Ok(Json(ApiResponse::ok("total expenses", ExpenseTotal { total })))
}

pub async fn by_category(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(category): Path<String>,
) -> Result<Json<ApiResponse<Vec<ExpenseView>>>, ServerError> {
    let expenses = state
        .engine
        .expenses_by_category(&principal, &category)
        .await?;
    let views = expenses.into_iter().map(ExpenseView::from).collect();
    Ok(Json(ApiResponse::ok("expenses", views)))
}

pub async fn update(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<ExpenseUpdate>,
) -> Result<Json<ApiResponse<ExpenseView>>, ServerError> {
    let expense = state
        .engine
        .update_expense(
            &principal,
            id,
            engine::ExpenseUpdate {
                amount: payload.amount,
                category: payload.category,
                date: payload.date,
            },
        )
        .await?;
    Ok(Json(ApiResponse::ok("expense updated", ExpenseView::from(expense))))
}

pub async fn remove(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_expense(&principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
