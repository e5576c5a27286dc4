pub mod competition;
pub mod leaderboard;
pub mod user;
pub mod user_competition;

pub use competition::{Competition, NewCompetition};
pub use leaderboard::{LeaderboardEntry, LeaderboardSnapshot};
pub use user::{NewUser, User};
pub use user_competition::{UserCompetition, UserCompetitionFilter};
