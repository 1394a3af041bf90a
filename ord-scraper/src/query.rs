use crate::fetcher::HttpClient;
use crate::types::{DatasetDescriptor, PollConfig, RecordEnvelope, Result, ScraperError};
use std::time::{Duration, Instant};
use tracing::{debug, info};

const DATASETS_PATH: &str = "datasets";
const SUBMIT_PATH: &str = "submit_query";
const FETCH_RESULT_PATH: &str = "fetch_query_result";

/// What a single poll response means for the task.
#[derive(Debug, PartialEq)]
pub enum PollDecision {
    /// The result set is built. A body that is not a JSON array counts as
    /// empty; items inside an array are kept as-is for the caller to vet.
    Ready(Vec<RecordEnvelope>),
    /// Still building; ask again later.
    Pending,
    /// Any other status ends polling.
    Failed(u16),
}

pub fn classify_poll_response(status: u16, body: &str) -> PollDecision {
    match status {
        200 => PollDecision::Ready(serde_json::from_str(body).unwrap_or_default()),
        202 => PollDecision::Pending,
        400 if body.to_lowercase().contains("not ready") => PollDecision::Pending,
        other => PollDecision::Failed(other),
    }
}

/// Client for the asynchronous query protocol: list datasets, submit a
/// query for one of them, then poll the task until its records are ready.
pub struct QueryClient {
    http: HttpClient,
    config: PollConfig,
}

impl QueryClient {
    pub fn new(http: HttpClient, config: PollConfig) -> Self {
        Self { http, config }
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.config.request_timeout_seconds)
    }

    pub async fn list_datasets(&self) -> Result<Vec<DatasetDescriptor>> {
        let url = self.http.endpoint(DATASETS_PATH)?;
        let response = self.http.get_ok(&url, &[] as &[(&str, &str)], self.request_timeout()).await?;
        let datasets: Vec<DatasetDescriptor> = response.json().await?;
        debug!("Service lists {} datasets", datasets.len());
        Ok(datasets)
    }

    /// Starts building a result set and returns its task id.
    pub async fn submit(&self, dataset_id: &str, limit: u64) -> Result<String> {
        let url = self.http.endpoint(SUBMIT_PATH)?;
        let limit = limit.to_string();
        let params = [("dataset_id", dataset_id), ("limit", limit.as_str())];

        let response = self.http.get_ok(&url, &params, self.request_timeout()).await?;
        let body = response.text().await?;
        let task_id = body.trim().trim_matches('"').to_string();

        if task_id.is_empty() {
            return Err(ScraperError::EmptyTaskId {
                dataset_id: dataset_id.to_string(),
            });
        }

        debug!("Submitted query for {} (limit {}): task {}", dataset_id, limit, task_id);
        Ok(task_id)
    }

    /// Polls a task until it is ready or the poll ceiling elapses.
    pub async fn poll(&self, task_id: &str) -> Result<Vec<RecordEnvelope>> {
        let url = self.http.endpoint(FETCH_RESULT_PATH)?;
        let params = [("task_id", task_id)];
        let ceiling = Duration::from_millis(self.config.poll_timeout_ms);
        let interval = Duration::from_millis(self.config.poll_interval_ms);
        let started = Instant::now();
        let mut attempts = 0u32;

        while started.elapsed() < ceiling {
            attempts += 1;
            let response = self.http.get(&url, &params, self.request_timeout()).await?;
            let status = response.status().as_u16();
            let body = response.text().await?;

            match classify_poll_response(status, &body) {
                PollDecision::Ready(records) => {
                    info!("Task {} ready after {} poll(s) with {} records", task_id, attempts, records.len());
                    return Ok(records);
                }
                PollDecision::Pending => {
                    debug!("Task {} not ready (HTTP {}), waiting {:?}", task_id, status, interval);
                    tokio::time::sleep(interval).await;
                }
                PollDecision::Failed(status) => {
                    return Err(ScraperError::RequestFailed {
                        url: url.to_string(),
                        status,
                    });
                }
            }
        }

        Err(ScraperError::PollTimeout {
            task_id: task_id.to_string(),
            timeout: ceiling,
        })
    }
}
