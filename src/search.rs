use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::SearchConfig;
use crate::http_client::search_http_client;
use crate::models::ConformedPlayer;

const API_KEY_HEADER: &str = "X-TYPESENSE-API-KEY";
const SEARCH_PAGE_SIZE: usize = 250;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search index unavailable: {0}")]
    Unavailable(String),
    #[error("search index rejected request ({status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("invalid search index response: {0}")]
    Decode(String),
}

/// Name/position/team criteria. Unset fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerSearch {
    pub name: Option<String>,
    pub position: Option<String>,
    pub team: Option<String>,
}

impl PlayerSearch {
    /// Drop blank criteria and trim the rest.
    pub fn normalized(self) -> Self {
        fn clean(v: Option<String>) -> Option<String> {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        }
        Self {
            name: clean(self.name),
            position: clean(self.position),
            team: clean(self.team),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerDocument {
    pub id: String,
    pub name: String,
    pub position: String,
    pub team: String,
    pub market_value_usd: f64,
}

impl From<&ConformedPlayer> for PlayerDocument {
    fn from(p: &ConformedPlayer) -> Self {
        Self {
            id: p.id.to_string(),
            name: p.name.clone(),
            position: p.position.clone(),
            team: p.team.clone(),
            market_value_usd: p.market_value_usd,
        }
    }
}

pub trait SearchIndex {
    /// Insert or replace documents by id. Returns how many the index accepted.
    fn upsert_players(&self, players: &[ConformedPlayer]) -> Result<usize, SearchError>;
    /// Ids of matching players, in index relevance order.
    fn search(&self, query: &PlayerSearch) -> Result<Vec<i64>, SearchError>;
}

/// Typesense collection of player documents.
pub struct TypesenseIndex {
    client: Client,
    base_url: String,
    api_key: String,
    collection: String,
}

impl TypesenseIndex {
    pub fn new(cfg: &SearchConfig) -> Result<Self, SearchError> {
        let client = search_http_client()
            .map_err(|e| SearchError::Unavailable(format!("{e:#}")))?
            .clone();
        Ok(Self::with_client(client, cfg))
    }

    pub fn with_client(client: Client, cfg: &SearchConfig) -> Self {
        Self {
            client,
            base_url: cfg.base_url(),
            api_key: cfg.api_key.clone(),
            collection: cfg.collection.clone(),
        }
    }

    /// Create the collection unless it already exists.
    pub fn ensure_collection(&self) -> Result<(), SearchError> {
        let resp = self
            .client
            .post(format!("{}/collections", self.base_url))
            .header(API_KEY_HEADER, &self.api_key)
            .json(&collection_schema(&self.collection))
            .send()
            .map_err(|e| SearchError::Unavailable(e.to_string()))?;
        let status = resp.status();
        if status.is_success() || status == StatusCode::CONFLICT {
            return Ok(());
        }
        Err(rejected(status, resp))
    }

    fn documents_url(&self, suffix: &str) -> String {
        format!(
            "{}/collections/{}/documents/{suffix}",
            self.base_url, self.collection
        )
    }
}

impl SearchIndex for TypesenseIndex {
    fn upsert_players(&self, players: &[ConformedPlayer]) -> Result<usize, SearchError> {
        if players.is_empty() {
            return Ok(0);
        }
        let mut body = String::new();
        for p in players {
            let line = serde_json::to_string(&PlayerDocument::from(p))
                .map_err(|e| SearchError::Decode(e.to_string()))?;
            body.push_str(&line);
            body.push('\n');
        }

        let resp = self
            .client
            .post(self.documents_url("import"))
            .query(&[("action", "upsert")])
            .header(API_KEY_HEADER, &self.api_key)
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(body)
            .send()
            .map_err(|e| SearchError::Unavailable(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(rejected(status, resp));
        }
        let text = resp
            .text()
            .map_err(|e| SearchError::Unavailable(e.to_string()))?;
        let (imported, failures) = parse_import_response(&text)?;
        if !failures.is_empty() {
            warn!(failed = failures.len(), first = %failures[0], "search import had failures");
        }
        debug!(imported, "upserted player documents");
        Ok(imported)
    }

    fn search(&self, query: &PlayerSearch) -> Result<Vec<i64>, SearchError> {
        let q = query.name.clone().unwrap_or_else(|| "*".to_string());
        let per_page = SEARCH_PAGE_SIZE.to_string();
        let mut params = vec![
            ("q", q),
            ("query_by", "name".to_string()),
            ("per_page", per_page),
        ];
        if let Some(filter) = filter_expression(query) {
            params.push(("filter_by", filter));
        }

        let resp = self
            .client
            .get(self.documents_url("search"))
            .query(&params)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .map_err(|e| SearchError::Unavailable(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(rejected(status, resp));
        }
        let text = resp
            .text()
            .map_err(|e| SearchError::Unavailable(e.to_string()))?;
        parse_search_response(&text)
    }
}

/// In-memory fallback: name and team are case-insensitive substrings, position is exact.
pub fn filter_players(players: &[ConformedPlayer], query: &PlayerSearch) -> Vec<ConformedPlayer> {
    let name = query.name.as_deref().map(str::to_lowercase);
    let team = query.team.as_deref().map(str::to_lowercase);
    players
        .iter()
        .filter(|p| {
            name.as_deref()
                .is_none_or(|n| p.name.to_lowercase().contains(n))
        })
        .filter(|p| query.position.as_deref().is_none_or(|pos| p.position == pos))
        .filter(|p| {
            team.as_deref()
                .is_none_or(|t| p.team.to_lowercase().contains(t))
        })
        .cloned()
        .collect()
}

pub fn collection_schema(name: &str) -> Value {
    json!({
        "name": name,
        "fields": [
            {"name": "name", "type": "string"},
            {"name": "position", "type": "string", "facet": true},
            {"name": "team", "type": "string", "facet": true},
            {"name": "market_value_usd", "type": "float"}
        ],
        "default_sorting_field": "market_value_usd"
    })
}

fn filter_expression(query: &PlayerSearch) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(position) = query.position.as_deref() {
        parts.push(format!("position:=`{}`", position.replace('`', "")));
    }
    if let Some(team) = query.team.as_deref() {
        parts.push(format!("team:=`{}`", team.replace('`', "")));
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" && "))
    }
}

fn parse_import_response(text: &str) -> Result<(usize, Vec<String>), SearchError> {
    let mut imported = 0usize;
    let mut failures = Vec::new();
    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        let v = serde_json::from_str::<Value>(line)
            .map_err(|e| SearchError::Decode(format!("import line: {e}")))?;
        if v.get("success").and_then(Value::as_bool).unwrap_or(false) {
            imported += 1;
        } else {
            let reason = v
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string();
            failures.push(reason);
        }
    }
    Ok((imported, failures))
}

fn parse_search_response(text: &str) -> Result<Vec<i64>, SearchError> {
    let v = serde_json::from_str::<Value>(text)
        .map_err(|e| SearchError::Decode(e.to_string()))?;
    let hits = v
        .get("hits")
        .and_then(Value::as_array)
        .ok_or_else(|| SearchError::Decode("missing hits array".to_string()))?;
    let mut ids = Vec::with_capacity(hits.len());
    for hit in hits {
        let raw = hit
            .get("document")
            .and_then(|d| d.get("id"))
            .ok_or_else(|| SearchError::Decode("hit without document id".to_string()))?;
        let id = raw
            .as_i64()
            .or_else(|| raw.as_str().and_then(|s| s.trim().parse::<i64>().ok()))
            .ok_or_else(|| SearchError::Decode(format!("non-numeric document id {raw}")))?;
        ids.push(id);
    }
    Ok(ids)
}

fn rejected(status: StatusCode, resp: reqwest::blocking::Response) -> SearchError {
    SearchError::Rejected {
        status: status.as_u16(),
        body: resp.text().unwrap_or_default(),
    }
}
