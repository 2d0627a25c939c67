pub mod auth_dto;
pub mod game_dto;
pub mod history_dto;
