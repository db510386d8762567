// Read-only HTTP collaborators: league roster, draft settings, player pool
// and persisted draft history.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use snakedraft_core::draft::history::DraftSlot;
use snakedraft_core::draft::model::{LeagueId, LeagueInfo, Player, Team};
use snakedraft_core::pool::StatSchema;

#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("unexpected response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

// ---------------------------------------------------------------------------
// Response shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LeagueSummary {
    #[serde(rename = "ID")]
    pub id: LeagueId,
    #[serde(rename = "Name")]
    pub name: String,
}

/// `GET /league/home/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LeagueHome {
    pub league: LeagueSummary,
    /// Go encodes an empty team list as `null`.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub teams: Vec<Team>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DraftSettings {
    #[serde(rename = "Rounds")]
    pub rounds: usize,
    /// Seconds per pick, 0 for none.
    #[serde(rename = "DraftClock", default)]
    pub draft_clock: u32,
}

#[derive(Debug, Clone, Deserialize)]
struct SettingsEnvelope {
    draft: DraftSettings,
}

/// `GET /draftpool`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PoolResponse {
    #[serde(rename = "Players", default, deserialize_with = "null_as_empty")]
    pub players: Vec<Player>,
    /// Column labels; servers that predate the field omit it.
    #[serde(rename = "Schema", default)]
    pub schema: Option<StatSchema>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Assemble the engine's league record from the two league endpoints.
pub fn league_info(home: LeagueHome, settings: DraftSettings) -> LeagueInfo {
    LeagueInfo {
        id: home.league.id,
        name: home.league.name,
        teams: home.teams,
        rounds: settings.rounds,
        draft_clock: settings.draft_clock,
    }
}

// ---------------------------------------------------------------------------
// Collaborator trait
// ---------------------------------------------------------------------------

/// Source of league data. The session holds it as a trait object so tests
/// can serve fixtures.
#[async_trait]
pub trait LeagueData: Send + Sync {
    async fn league_home(&self, league: LeagueId) -> Result<LeagueHome, CollaboratorError>;

    async fn draft_settings(&self, league: LeagueId) -> Result<DraftSettings, CollaboratorError>;

    async fn draft_pool(&self) -> Result<PoolResponse, CollaboratorError>;

    async fn draft_history(&self, league: LeagueId) -> Result<Vec<DraftSlot>, CollaboratorError>;
}

/// `LeagueData` backed by the league server's HTTP API.
#[derive(Debug, Clone)]
pub struct HttpLeagueData {
    http: reqwest::Client,
    base_url: String,
}

impl HttpLeagueData {
    /// `base_url` is the scheme and host, e.g. `http://localhost:8080`.
    pub fn new(base_url: impl Into<String>) -> Self {
        HttpLeagueData {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, CollaboratorError> {
        let url = format!("{}{path}", self.base_url);
        debug!("GET {url}");
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| CollaboratorError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CollaboratorError::Status {
                url,
                status: status.as_u16(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|source| CollaboratorError::Decode { url, source })
    }
}

#[async_trait]
impl LeagueData for HttpLeagueData {
    async fn league_home(&self, league: LeagueId) -> Result<LeagueHome, CollaboratorError> {
        self.get_json(&format!("/league/home/{league}")).await
    }

    async fn draft_settings(&self, league: LeagueId) -> Result<DraftSettings, CollaboratorError> {
        let envelope: SettingsEnvelope = self
            .get_json(&format!("/league/settings/getdraft/{league}"))
            .await?;
        Ok(envelope.draft)
    }

    async fn draft_pool(&self) -> Result<PoolResponse, CollaboratorError> {
        self.get_json("/draftpool").await
    }

    async fn draft_history(&self, league: LeagueId) -> Result<Vec<DraftSlot>, CollaboratorError> {
        self.get_json(&format!("/league/draft/{league}")).await
    }
}
