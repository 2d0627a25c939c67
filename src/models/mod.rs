pub mod answer;
pub mod evaluation;
pub mod question;
pub mod session;
pub mod user;
