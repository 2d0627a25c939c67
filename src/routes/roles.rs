use axum::Json;

use crate::dto::game_dto::RoleSummary;
use crate::services::role_catalog;

#[axum::debug_handler]
pub async fn list_roles() -> Json<Vec<RoleSummary>> {
    let roles = role_catalog::all()
        .iter()
        .map(|r| RoleSummary {
            id: r.id,
            name: r.name,
            difficulty: r.difficulty.as_str(),
            description: r.description,
        })
        .collect();
    Json(roles)
}
