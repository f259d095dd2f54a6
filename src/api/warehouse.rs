use crate::config::{Config, WarehouseConfig};
use crate::error::SyncError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Tables the sync jobs read and write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    NflGames,
    NflUpcomingGames,
    NflLineSnapshots,
    NflPropLineSnapshots,
    NflBoxScores,
    NflTeamRankings,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::NflGames => "nfl_games",
            Table::NflUpcomingGames => "nfl_upcoming_games",
            Table::NflLineSnapshots => "nfl_line_snapshots",
            Table::NflPropLineSnapshots => "nfl_prop_line_snapshots",
            Table::NflBoxScores => "nfl_box_scores_v2",
            Table::NflTeamRankings => "nfl_team_rankings",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Values bound to `{name:Type}` placeholders in a statement.
///
/// Each one is sent as a `param_<name>` URL parameter, so values never
/// become part of the SQL text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(mut self, name: &str, value: impl fmt::Display) -> Self {
        self.0.push((format!("param_{}", name), value.to_string()));
        self
    }

    /// Bind an `Array(String)` parameter
    pub fn bind_strings<S: AsRef<str>>(mut self, name: &str, values: &[S]) -> Self {
        let items: Vec<String> = values
            .iter()
            .map(|v| format!("'{}'", escape_array_item(v.as_ref())))
            .collect();
        self.0
            .push((format!("param_{}", name), format!("[{}]", items.join(","))));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn escape_array_item(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Client for the ClickHouse HTTP interface
#[derive(Clone)]
pub struct WarehouseClient {
    config: WarehouseConfig,
    client: reqwest::Client,
}

impl WarehouseClient {
    pub fn new(config: WarehouseConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    pub fn from_config(config: &Config) -> Result<Self, SyncError> {
        Ok(Self::new(
            config.require_warehouse()?.clone(),
            config.http_client(),
        ))
    }

    async fn post(
        &self,
        query: &[(String, String)],
        body: String,
    ) -> Result<String, SyncError> {
        let response = self
            .client
            .post(&self.config.host)
            .basic_auth(&self.config.key_id, Some(&self.config.key_secret))
            .query(query)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(SyncError::Warehouse(format!(
                "{}: {}",
                status,
                text.trim()
            )));
        }
        Ok(text)
    }

    /// Run a SELECT and decode each JSONEachRow line into `T`
    pub async fn query<T: DeserializeOwned>(
        &self,
        sql: &str,
        params: Params,
    ) -> Result<Vec<T>, SyncError> {
        let mut query = params.0;
        query.push(("default_format".to_string(), "JSONEachRow".to_string()));
        query.push((
            "output_format_json_quote_64bit_integers".to_string(),
            "0".to_string(),
        ));

        debug!("Warehouse query: {}", sql.trim());
        let text = self.post(&query, sql.to_string()).await?;

        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed == "OK" {
            return Ok(Vec::new());
        }

        trimmed
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str::<T>(line).map_err(SyncError::from))
            .collect()
    }

    /// Run a statement that returns no rows (TRUNCATE, ALTER ... UPDATE/DELETE)
    pub async fn command(&self, sql: &str, params: Params) -> Result<(), SyncError> {
        debug!("Warehouse command: {}", sql.trim());
        self.post(&params.0, sql.to_string()).await?;
        Ok(())
    }

    /// Append rows as newline-delimited JSON. No request is made for an
    /// empty slice.
    pub async fn insert<T: Serialize>(&self, table: Table, rows: &[T]) -> Result<usize, SyncError> {
        if rows.is_empty() {
            return Ok(0);
        }

        let mut body = String::new();
        for row in rows {
            body.push_str(&serde_json::to_string(row)?);
            body.push('\n');
        }

        let query = vec![(
            "query".to_string(),
            format!("INSERT INTO {} FORMAT JSONEachRow", table),
        )];
        debug!("Inserting {} rows into {}", rows.len(), table);
        self.post(&query, body).await?;
        Ok(rows.len())
    }

    pub async fn truncate(&self, table: Table) -> Result<(), SyncError> {
        self.command(&format!("TRUNCATE TABLE {}", table), Params::new())
            .await
    }
}
