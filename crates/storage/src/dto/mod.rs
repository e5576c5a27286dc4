pub mod competition;
pub mod ranking;
pub mod user;
