use crate::config::Config;
use crate::error::SyncError;
use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const SERVICE: &str = "Odds API";
const SPORT_KEY: &str = "americanfootball_nfl";
const REGIONS: &str = "us,us2";
const GAME_MARKETS: &str = "h2h,spreads,totals";

/// Player prop markets pulled per event
pub const PROP_MARKETS: [&str; 12] = [
    "player_pass_yds",
    "player_pass_tds",
    "player_pass_attempts",
    "player_pass_completions",
    "player_rush_yds",
    "player_rush_attempts",
    "player_rush_tds",
    "player_receptions",
    "player_reception_yds",
    "player_reception_tds",
    "player_pass_rush_yds",
    "player_rush_reception_yds",
];

/// A single event from The Odds API, with or without bookmaker odds
#[derive(Debug, Clone, Deserialize)]
pub struct OddsEvent {
    pub id: String,
    #[serde(default)]
    pub sport_title: String,
    pub commence_time: DateTime<Utc>,
    #[serde(default)]
    pub home_team: String,
    #[serde(default)]
    pub away_team: String,
    #[serde(default)]
    pub bookmakers: Vec<OddsBookmaker>,
}

/// Bookmaker data from The Odds API
#[derive(Debug, Clone, Deserialize)]
pub struct OddsBookmaker {
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub last_update: Option<DateTime<Utc>>,
    #[serde(default)]
    pub markets: Vec<OddsMarket>,
}

/// Market data (h2h, spreads, totals, player_*)
#[derive(Debug, Clone, Deserialize)]
pub struct OddsMarket {
    pub key: String,
    #[serde(default)]
    pub outcomes: Vec<OddsOutcome>,
}

/// Outcome data. `point` is set for spreads, totals and props;
/// `description` carries the player name for props.
#[derive(Debug, Clone, Deserialize)]
pub struct OddsOutcome {
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub point: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Request quota reported by the odds feed on every response
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ApiQuota {
    pub remaining: Option<String>,
    pub used: Option<String>,
}

impl ApiQuota {
    fn from_headers(headers: &HeaderMap) -> Self {
        let get = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        Self {
            remaining: get("x-requests-remaining"),
            used: get("x-requests-used"),
        }
    }
}

pub struct OddsApiClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl OddsApiClient {
    pub fn new(api_key: String, base_url: String, client: reqwest::Client) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, SyncError> {
        Ok(Self::new(
            config.require_odds_key()?.to_string(),
            config.odds_base_url.clone(),
            config.http_client(),
        ))
    }

    /// Upcoming NFL games with moneyline, spread and total odds from every
    /// US bookmaker, plus the quota left after the call
    pub async fn fetch_upcoming_nfl(&self) -> Result<(Vec<OddsEvent>, ApiQuota), SyncError> {
        let url = format!("{}/sports/{}/odds", self.base_url, SPORT_KEY);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("apiKey", self.api_key.as_str()),
                ("regions", REGIONS),
                ("markets", GAME_MARKETS),
                ("oddsFormat", "american"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SyncError::UpstreamStatus {
                service: SERVICE,
                status: response.status(),
            });
        }

        let quota = ApiQuota::from_headers(response.headers());
        let events: Vec<OddsEvent> = response
            .json()
            .await
            .map_err(|e| SyncError::decode(SERVICE, e))?;

        info!(
            "Found {} upcoming NFL games (quota remaining: {})",
            events.len(),
            quota.remaining.as_deref().unwrap_or("?")
        );

        Ok((events, quota))
    }

    /// Player prop odds for one event
    pub async fn fetch_event_props(&self, event_id: &str) -> Result<OddsEvent, SyncError> {
        let url = format!(
            "{}/sports/{}/events/{}/odds",
            self.base_url, SPORT_KEY, event_id
        );
        let markets = PROP_MARKETS.join(",");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("apiKey", self.api_key.as_str()),
                ("regions", REGIONS),
                ("markets", markets.as_str()),
                ("oddsFormat", "american"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SyncError::UpstreamStatus {
                service: SERVICE,
                status: response.status(),
            });
        }

        let event: OddsEvent = response
            .json()
            .await
            .map_err(|e| SyncError::decode(SERVICE, e))?;
        debug!(
            "Fetched props for {} from {} bookmakers",
            event_id,
            event.bookmakers.len()
        );

        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> OddsApiClient {
        OddsApiClient::new("odds-key".to_string(), server.uri(), reqwest::Client::new())
    }

    #[tokio::test]
    async fn test_fetch_upcoming_nfl() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sports/americanfootball_nfl/odds"))
            .and(query_param("apiKey", "odds-key"))
            .and(query_param("regions", "us,us2"))
            .and(query_param("markets", "h2h,spreads,totals"))
            .and(query_param("oddsFormat", "american"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("x-requests-remaining", "480")
                    .insert_header("x-requests-used", "20")
                    .set_body_json(json!([{
                        "id": "evt1",
                        "sport_title": "NFL",
                        "commence_time": "2025-10-19T17:00:00Z",
                        "home_team": "Buffalo Bills",
                        "away_team": "New York Jets",
                        "bookmakers": [{
                            "key": "draftkings",
                            "title": "DraftKings",
                            "last_update": "2025-10-17T12:00:00Z",
                            "markets": [{
                                "key": "spreads",
                                "outcomes": [
                                    { "name": "Buffalo Bills", "price": -110, "point": -7.5 },
                                    { "name": "New York Jets", "price": -110, "point": 7.5 }
                                ]
                            }]
                        }]
                    }])),
            )
            .mount(&server)
            .await;

        let (events, quota) = client(&server).fetch_upcoming_nfl().await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].bookmakers[0].markets[0].outcomes[0].point, Some(-7.5));
        assert_eq!(quota.remaining.as_deref(), Some("480"));
        assert_eq!(quota.used.as_deref(), Some("20"));
    }

    #[tokio::test]
    async fn test_fetch_upcoming_nfl_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sports/americanfootball_nfl/odds"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = client(&server).fetch_upcoming_nfl().await.unwrap_err();
        assert_eq!(err.to_string(), "Odds API returned error: 401 Unauthorized");
    }

    #[tokio::test]
    async fn test_fetch_event_props() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sports/americanfootball_nfl/events/evt1/odds"))
            .and(query_param("markets", PROP_MARKETS.join(",").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "evt1",
                "commence_time": "2025-10-19T17:00:00Z",
                "bookmakers": [{
                    "key": "fanduel",
                    "title": "FanDuel",
                    "markets": [{
                        "key": "player_pass_yds",
                        "outcomes": [
                            { "name": "Over", "description": "Josh Allen", "price": -115, "point": 245.5 },
                            { "name": "Under", "description": "Josh Allen", "price": -105, "point": 245.5 }
                        ]
                    }]
                }]
            })))
            .mount(&server)
            .await;

        let event = client(&server).fetch_event_props("evt1").await.unwrap();
        let outcome = &event.bookmakers[0].markets[0].outcomes[0];
        assert_eq!(outcome.description.as_deref(), Some("Josh Allen"));
        assert!(event.home_team.is_empty());
    }

    #[tokio::test]
    #[ignore]
    async fn test_fetch_live_odds() {
        let config = Config::from_env();
        let client = OddsApiClient::from_config(&config).unwrap();

        let (events, _) = client.fetch_upcoming_nfl().await.unwrap();
        assert!(!events.is_empty());
    }
}
