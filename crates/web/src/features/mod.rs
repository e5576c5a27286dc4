pub mod competitions;
pub mod rankings;
pub mod users;
