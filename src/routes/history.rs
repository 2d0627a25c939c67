use axum::{extract::State, Json};

use crate::dto::history_dto::HistoryResponse;
use crate::middleware::auth::AuthUser;
use crate::AppState;

#[axum::debug_handler]
pub async fn history(
    State(state): State<AppState>,
    user: AuthUser,
) -> crate::error::Result<Json<HistoryResponse>> {
    let history = state.history_service.for_user(user.id()).await?;
    Ok(Json(HistoryResponse { history }))
}
