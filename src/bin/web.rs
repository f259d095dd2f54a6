use anyhow::{Context, Result};
use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Local;
use insider_sync::api::insider_api::InsiderApiClient;
use insider_sync::config::Config;
use insider_sync::widgets::{
    MatchupWidgetData, PublicBettingData, StatsWidgetData, WidgetAggregator,
};
use insider_sync::{fetch_widget_data, logging, run_upcoming_sync, run_weekly_sync, League};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// How long a sport's public-betting board is served from memory
const PUBLIC_BETTING_TTL: Duration = Duration::from_secs(30 * 60);

mod filters {
    pub fn pct(value: &u32) -> ::askama::Result<String> {
        Ok(format!("{}%", value))
    }
}

#[derive(Template)]
#[template(path = "widgets.html")]
struct WidgetsTemplate {
    stats: StatsWidgetData,
    matchup: MatchupWidgetData,
}

struct HtmlTemplate<T>(T);

impl<T> IntoResponse for HtmlTemplate<T>
where
    T: Template,
{
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to render template: {}", err),
            )
                .into_response(),
        }
    }
}

type BoardCache = Arc<RwLock<HashMap<League, (Instant, PublicBettingData)>>>;

#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    public_betting: BoardCache,
}

impl AppState {
    fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            public_betting: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn insider_client(&self) -> Result<InsiderApiClient, Response> {
        InsiderApiClient::from_config(&self.config).map_err(|e| {
            error!("{}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        })
    }
}

fn sync_failure(e: impl std::fmt::Display) -> Response {
    error!("Sync failed: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "success": false, "error": e.to_string() })),
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
struct UpcomingParams {
    props: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WeeklyParams {
    season: Option<i32>,
    week: Option<u32>,
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn sync_upcoming(
    State(state): State<AppState>,
    Query(params): Query<UpcomingParams>,
) -> Response {
    let include_props = params.props.as_deref() != Some("false");

    match run_upcoming_sync(&state.config, include_props).await {
        Ok(report) => Json(report).into_response(),
        Err(e) => sync_failure(e),
    }
}

async fn sync_weekly(State(state): State<AppState>, Query(params): Query<WeeklyParams>) -> Response {
    match run_weekly_sync(&state.config, params.season, params.week).await {
        Ok(report) => Json(report).into_response(),
        Err(e) => sync_failure(e),
    }
}

async fn stats_widget(State(state): State<AppState>) -> Response {
    let client = match state.insider_client() {
        Ok(client) => client,
        Err(response) => return response,
    };

    let data = WidgetAggregator::new(&client, Local::now().naive_local())
        .stats_widget_data()
        .await;
    Json(data).into_response()
}

async fn matchup_widget(State(state): State<AppState>) -> Response {
    let client = match state.insider_client() {
        Ok(client) => client,
        Err(response) => return response,
    };

    let data = WidgetAggregator::new(&client, Local::now().naive_local())
        .matchup_widget_data()
        .await;
    Json(data).into_response()
}

async fn public_betting(State(state): State<AppState>, Path(sport): Path<String>) -> Response {
    let Ok(league) = sport.parse::<League>() else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Invalid sport" })),
        )
            .into_response();
    };

    if let Some((fetched_at, board)) = state.public_betting.read().await.get(&league) {
        if fetched_at.elapsed() < PUBLIC_BETTING_TTL {
            info!("Serving cached {} public betting data", league.code());
            return Json(board.clone()).into_response();
        }
    }

    let client = match InsiderApiClient::from_config(&state.config) {
        Ok(client) => client,
        Err(e) => {
            error!("Public betting for {} failed: {}", league.code(), e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch public betting data" })),
            )
                .into_response();
        }
    };

    let board = WidgetAggregator::new(&client, Local::now().naive_local())
        .public_betting(league)
        .await;

    state
        .public_betting
        .write()
        .await
        .insert(league, (Instant::now(), board.clone()));

    Json(board).into_response()
}

async fn widgets_page(State(state): State<AppState>) -> Response {
    let client = match state.insider_client() {
        Ok(client) => client,
        Err(response) => return response,
    };

    let data = fetch_widget_data(&client, Local::now().naive_local()).await;
    HtmlTemplate(WidgetsTemplate {
        stats: data.stats,
        matchup: data.matchup,
    })
    .into_response()
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/widgets", get(widgets_page))
        .route(
            "/api/clickhouse/sync-upcoming-games",
            get(sync_upcoming),
        )
        .route(
            "/api/clickhouse/weekly-sync",
            get(sync_weekly).post(sync_weekly),
        )
        .route("/api/widget-data/stats", get(stats_widget))
        .route("/api/widget-data/matchup", get(matchup_widget))
        .route("/api/public-betting/:sport", get(public_betting))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();
    logging::init();

    let bind_address = config.bind_address.clone();
    let state = AppState::new(config);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    info!("Starting web server at http://{}", bind_address);
    axum::serve(listener, app(state))
        .await
        .context("Server error")?;

    Ok(())
}
