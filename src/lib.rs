pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::services::{
    battle_service::BattleService, history_service::HistoryService,
    llm_service::{HttpLlmGateway, LlmGateway},
    question_service::QuestionService, session_service::SessionService,
    user_service::UserService,
};
use reqwest::Client;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub session_service: SessionService,
    pub question_service: QuestionService,
    pub battle_service: BattleService,
    pub user_service: UserService,
    pub history_service: HistoryService,
}

impl AppState {
    pub fn new(pool: PgPool, config: Config) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build HTTP client: {}", e)))?;
        let llm = Arc::new(HttpLlmGateway::new(config.llm.clone(), http_client));
        Ok(Self::with_gateway(pool, config, llm))
    }

    /// Builds the state around an arbitrary model gateway.
    pub fn with_gateway(pool: PgPool, config: Config, llm: Arc<dyn LlmGateway>) -> Self {
        let session_service = SessionService::new(pool.clone());
        let question_service = QuestionService::new(llm.clone(), session_service.clone());
        let battle_service = BattleService::new(llm, session_service.clone());
        let user_service = UserService::new(pool);
        let history_service = HistoryService::new(session_service.clone());

        Self {
            config: Arc::new(config),
            session_service,
            question_service,
            battle_service,
            user_service,
            history_service,
        }
    }
}
