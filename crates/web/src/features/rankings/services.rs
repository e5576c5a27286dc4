use storage::{
    dto::ranking::OverallRankingEntry,
    error::Result,
    services::{TOP_N, ranking::RankingEngine},
};

/// Overall top 20 with usernames
pub async fn overall_top(engine: &RankingEngine) -> Result<Vec<OverallRankingEntry>> {
    let users = engine.top_n_overall(TOP_N).await?;

    Ok(users
        .into_iter()
        .zip(1u32..)
        .map(|(user, position)| OverallRankingEntry {
            position,
            user_id: user.user_id,
            username: user.username,
            overall_rank: user.overall_rank,
        })
        .collect())
}
