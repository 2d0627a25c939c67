pub mod auth;
pub mod game;
pub mod health;
pub mod history;
pub mod roles;

use crate::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health::health))
        .route("/roles", get(roles::list_roles))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        .route("/game/start", post(game::start_game))
        .route("/game/question", post(game::next_question))
        .route("/game/answer", post(game::submit_answer))
        .route("/game/abandon", post(game::abandon_game))
        .route("/history", get(history::history));

    Router::new()
        .route("/health", get(health::health))
        .nest("/api", api)
        .with_state(state)
}
