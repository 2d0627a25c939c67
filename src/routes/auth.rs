use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::dto::auth_dto::{AuthResponse, CredentialsRequest, MeResponse, UserView};
use crate::middleware::auth::MaybeUser;
use crate::models::user::User;
use crate::utils::token::issue_token;
use crate::AppState;

fn auth_response(state: &AppState, user: User) -> crate::error::Result<AuthResponse> {
    let token = issue_token(
        user.id,
        &user.email,
        &state.config.jwt_secret,
        state.config.jwt_ttl_hours,
    )?;
    Ok(AuthResponse {
        token,
        user: user.into(),
    })
}

#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> crate::error::Result<impl IntoResponse> {
    req.validate()?;
    let user = state.user_service.register(&req.email, &req.password).await?;
    let body = auth_response(&state, user)?;
    Ok((StatusCode::CREATED, Json(body)))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> crate::error::Result<Json<AuthResponse>> {
    req.validate()?;
    let user = state
        .user_service
        .authenticate(&req.email, &req.password)
        .await?;
    tracing::info!(user_id = %user.id, "user logged in");
    Ok(Json(auth_response(&state, user)?))
}

#[axum::debug_handler]
pub async fn me(
    State(state): State<AppState>,
    MaybeUser(user_id): MaybeUser,
) -> crate::error::Result<Json<MeResponse>> {
    let user = match user_id {
        Some(id) => state.user_service.find_by_id(id).await?.map(UserView::from),
        None => None,
    };
    Ok(Json(MeResponse { user }))
}
