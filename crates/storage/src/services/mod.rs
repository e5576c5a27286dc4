pub mod leaderboard;
pub mod notification;
pub mod orchestrator;
pub mod ranking;
pub mod seed;

/// Size of every tracked leaderboard window
pub const TOP_N: usize = 20;
