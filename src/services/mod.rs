pub mod battle_service;
pub mod grade_parser;
pub mod history_service;
pub mod llm_service;
pub mod prompt_service;
pub mod question_service;
pub mod role_catalog;
pub mod session_service;
pub mod user_service;
