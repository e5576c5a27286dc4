//! Demo data set: 21 users racing in one competition.

use crate::error::Result;

use super::orchestrator::{CycleReport, Orchestrator};

const USERNAMES: [&str; 21] = [
    "bob", "notbob", "sparky", "pierce", "vedesh", "parbs", "brian", "andy", "keegan", "jeff",
    "whocares", "anotherone", "drake", "uzi", "carti", "offset", "quavo", "blueface", "random",
    "salik", "outsider",
];

const FINAL_RANKS: [i32; 21] = [
    40, 43, 44, 45, 20, 54, 30, 29, 47, 49, 51, 62, 31, 19, 14, 39, 45, 50, 21, 22, 23,
];

/// Reports of the two cycles run after loading the data
#[derive(Debug)]
pub struct SeedReport {
    pub comp_id: i32,
    pub changes: CycleReport,
    pub standings: CycleReport,
}

/// Load the demo data into an empty store, then run the delta cycle
/// followed by the notify-all cycle
pub async fn seed(orchestrator: &Orchestrator) -> Result<SeedReport> {
    let engine = orchestrator.engine();

    let mut user_ids = Vec::with_capacity(USERNAMES.len());
    for username in USERNAMES {
        user_ids.push(engine.create_user(username, "bobpass").await?.user_id);
    }

    let competition = engine.create_competition("theboys", "sando").await?;
    let comp_id = competition.comp_id;

    for &user_id in &user_ids {
        orchestrator.register(user_id, comp_id, 1).await?;
    }
    orchestrator.update_and_notify_top_20(comp_id).await?;

    for (&user_id, &rank) in user_ids.iter().zip(FINAL_RANKS.iter()) {
        orchestrator.update_rank(user_id, comp_id, rank).await?;
    }

    let changes = orchestrator.update_and_notify_top_20(comp_id).await?;
    let standings = orchestrator.manage_top_20_and_notify(comp_id).await?;

    tracing::info!(
        comp_id,
        users = user_ids.len(),
        "Demo data loaded"
    );

    Ok(SeedReport {
        comp_id,
        changes,
        standings,
    })
}
