//! User profile and admin management endpoints.

use api_types::{
    ApiResponse, ListQuery,
    dashboard::SummaryView,
    user::{AdminUserUpdateRequest, ProfileUpdateRequest, UserView},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::Principal;
use serde::Deserialize;

use crate::{ServerError, page_from, server::ServerState};

pub async fn profile(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
) -> Result<Json<ApiResponse<UserView>>, ServerError> {
    let user = state.engine.profile(&principal).await?;
    Ok(Json(ApiResponse::ok("profile", UserView::from(user))))
}

pub async fn update_profile(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Json(payload): Json<ProfileUpdateRequest>,
) -> Result<Json<ApiResponse<UserView>>, ServerError> {
    let user = state
        .engine
        .update_profile(
            &principal,
            engine::ProfileUpdate {
                email: payload.email,
                password: payload.password,
                first_name: payload.first_name,
                last_name: payload.last_name,
            },
        )
        .await?;
    Ok(Json(ApiResponse::ok("profile updated", UserView::from(user))))
}

pub async fn admin_list(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<UserView>>>, ServerError> {
    let users = state.engine.users(&principal, page_from(&query)).await?;
    let views = users.into_iter().map(UserView::from).collect();
    Ok(Json(ApiResponse::ok("users", views)))
}

pub async fn admin_get(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<UserView>>, ServerError> {
    let user = state.engine.user(&principal, id).await?;
    Ok(Json(ApiResponse::ok("user", UserView::from(user))))
}

pub async fn admin_update(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<AdminUserUpdateRequest>,
) -> Result<Json<ApiResponse<UserView>>, ServerError> {
    let user = state
        .engine
        .admin_update_user(
            &principal,
            id,
            engine::AdminUserUpdate {
                role: payload.role,
                is_active: payload.is_active,
                is_verified: payload.is_verified,
                balance: payload.balance,
            },
        )
        .await?;
    Ok(Json(ApiResponse::ok("user updated", UserView::from(user))))
}

pub async fn admin_remove(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_user(&principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub user_id: Option<i32>,
}

/// Admin summary: one user when `user_id` is given, the whole system
/// otherwise.
pub async fn admin_summary(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<ApiResponse<SummaryView>>, ServerError> {
    let summary = state
        .engine
        .balance_summary(&principal, query.user_id)
        .await?;
    Ok(Json(ApiResponse::ok("summary", SummaryView::from(summary))))
}
