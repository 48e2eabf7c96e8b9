//! Dashboard API endpoints.

use api_types::{ApiResponse, dashboard::SummaryView};
use axum::{Extension, Json, extract::State};
use engine::Principal;

use crate::{ServerError, server::ServerState};

/// The authenticated user's own balance summary.
pub async fn balance(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
) -> Result<Json<ApiResponse<SummaryView>>, ServerError> {
    let summary = state.engine.balance_summary(&principal, None).await?;
    Ok(Json(ApiResponse::ok("balance", SummaryView::from(summary))))
}
