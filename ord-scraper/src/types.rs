use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://open-reaction-database.org/api";
pub const DEFAULT_USER_AGENT: &str = "ORD-Scraper-Advanced/3.0";

/// Priority buckets checked, in order, against each normalized input name.
pub const CORE_CATEGORIES: [&str; 6] = ["base", "solvent", "amine", "aryl halide", "metal", "ligand"];

/// A scrapeable collection as listed by `GET /datasets`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetDescriptor {
    pub dataset_id: String,
    #[serde(default)]
    pub num_reactions: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// One raw JSON item of a finished query. Only `proto` is read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordEnvelope(serde_json::Value);

impl RecordEnvelope {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// The base64 payload. Missing, null and empty payloads are `None`.
    pub fn payload(&self) -> Result<Option<&str>> {
        let item = self.0.as_object().ok_or_else(|| ScraperError::InvalidEnvelope {
            reason: format!("expected an object, got {}", json_kind(&self.0)),
        })?;

        match item.get("proto") {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(serde_json::Value::String(p)) if p.is_empty() => Ok(None),
            Some(serde_json::Value::String(p)) => Ok(Some(p.as_str())),
            Some(other) => Err(ScraperError::InvalidEnvelope {
                reason: format!("proto is {}, not a string", json_kind(other)),
            }),
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentEntry {
    pub value: String,
    pub role: String,
}

pub type ComponentMap = IndexMap<String, Vec<ComponentEntry>>;

/// A unit of scrape output. Serialized without a tag so each variant keeps
/// the flat shape consumers expect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScrapeRecord {
    Reaction {
        dataset_id: String,
        reaction_id: String,
        components: ComponentMap,
        success: bool,
    },
    ReactionError {
        dataset_id: String,
        reaction_id: String,
        error: String,
    },
    DatasetError {
        dataset_id: String,
        error: String,
    },
}

impl ScrapeRecord {
    pub fn dataset_id(&self) -> &str {
        match self {
            ScrapeRecord::Reaction { dataset_id, .. }
            | ScrapeRecord::ReactionError { dataset_id, .. }
            | ScrapeRecord::DatasetError { dataset_id, .. } => dataset_id,
        }
    }

    pub fn reaction_id(&self) -> Option<&str> {
        match self {
            ScrapeRecord::Reaction { reaction_id, .. }
            | ScrapeRecord::ReactionError { reaction_id, .. } => Some(reaction_id),
            ScrapeRecord::DatasetError { .. } => None,
        }
    }

    pub fn is_error(&self) -> bool {
        !matches!(self, ScrapeRecord::Reaction { .. })
    }
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub api_base: String,
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub max_retry_delay_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_seconds: 30,
            max_retries: 5,
            retry_delay_ms: 1_000,
            max_retry_delay_ms: 120_000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PollConfig {
    pub poll_interval_ms: u64,
    pub poll_timeout_ms: u64,
    pub request_timeout_seconds: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 2_000,
            poll_timeout_ms: 90_000,
            request_timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub fetch: FetchConfig,
    pub poll: PollConfig,
    pub dataset_pause_ms: u64,
    pub categories: Vec<String>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            poll: PollConfig::default(),
            dataset_pause_ms: 1_000,
            categories: CORE_CATEGORIES.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Per-run dataset selection.
#[derive(Debug, Clone, Default)]
pub struct ScrapeOptions {
    /// `None` scrapes every dataset.
    pub max_datasets: Option<usize>,
    /// 0 fetches every reaction the dataset reports.
    pub per_dataset_limit: u64,
    pub dataset_ids: Option<Vec<String>>,
}

#[derive(Debug, thiserror::Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request to {url} failed with HTTP {status}")]
    RequestFailed { url: String, status: u16 },

    #[error("Query result for task={task_id} timed out after {timeout:?}")]
    PollTimeout { task_id: String, timeout: Duration },

    #[error("Service returned an empty task id for dataset {dataset_id}")]
    EmptyTaskId { dataset_id: String },

    #[error("Malformed query result item: {reason}")]
    InvalidEnvelope { reason: String },

    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Reaction decode error: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("Unknown reaction role code: {0}")]
    UnknownRole(i32),

    #[error("Reaction schema unavailable: {0}")]
    SchemaUnavailable(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ScraperError {
    /// Errors that must stop the whole run rather than a single dataset.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ScraperError::SchemaUnavailable(_))
    }
}

pub type Result<T> = std::result::Result<T, ScraperError>;
