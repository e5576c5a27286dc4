pub mod competition;
pub mod user;
pub mod user_competition;
