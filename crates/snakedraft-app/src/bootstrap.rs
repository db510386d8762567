// Session bootstrap: fetch everything the engine needs before joining the
// draft room.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use snakedraft_core::draft::model::{DraftPool, LeagueId, LeagueInfo};
use snakedraft_core::draft::state::DraftState;
use snakedraft_core::pool::StatSchema;

use crate::collaborator::{league_info, LeagueData};

/// Initial engine inputs.
#[derive(Debug, Clone)]
pub struct Bootstrap {
    pub state: DraftState,
    pub schema: StatSchema,
}

/// Fetch the league, roster and persisted history, and build the initial
/// draft state.
pub async fn load(data: &dyn LeagueData, league: LeagueId) -> anyhow::Result<Bootstrap> {
    let info = load_league(data, league).await?;
    info!(
        "League {} loaded: {} teams, {} rounds, clock {}s",
        info.name,
        info.teams.len(),
        info.rounds,
        info.draft_clock
    );

    let pool = data
        .draft_pool()
        .await
        .context("failed to fetch the draft pool")?;
    let schema = match pool.schema {
        Some(schema) if !schema.is_empty() => schema,
        _ => StatSchema::football(),
    };
    let pool = DraftPool::new(pool.players);
    info!("Draft pool loaded: {} players", pool.len());

    let history = data
        .draft_history(league)
        .await
        .context("failed to fetch the draft history")?;
    let persisted = history.len();

    let state = DraftState::new(Arc::new(info), Arc::new(pool), history)
        .context("league cannot be drafted")?;
    info!(
        "Draft state ready: {persisted} picks persisted, {} total",
        state.total_picks()
    );

    Ok(Bootstrap { state, schema })
}

pub async fn load_league(data: &dyn LeagueData, league: LeagueId) -> anyhow::Result<LeagueInfo> {
    let home = data
        .league_home(league)
        .await
        .with_context(|| format!("failed to fetch league {league}"))?;
    let settings = data
        .draft_settings(league)
        .await
        .with_context(|| format!("failed to fetch draft settings for league {league}"))?;
    Ok(league_info(home, settings))
}

/// Re-fetch the persisted history and rebuild `current` from it.
pub async fn refetch(data: &dyn LeagueData, current: &DraftState) -> anyhow::Result<DraftState> {
    let league = current.league().id;
    let history = data
        .draft_history(league)
        .await
        .context("failed to fetch the draft history")?;
    current
        .rebuild(history)
        .context("fetched draft history is inconsistent")
}
