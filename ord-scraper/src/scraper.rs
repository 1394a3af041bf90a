use crate::extractor::Extractor;
use crate::fetcher::HttpClient;
use crate::parser::RecordDecoder;
use crate::query::QueryClient;
use crate::schema::ReactionSchema;
use crate::types::{DatasetDescriptor, Result, ScrapeConfig, ScrapeOptions, ScrapeRecord};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Reactions requested for one dataset. 0 from the caller means "all the
/// dataset reports", and a reported count of 0 in turn means "all".
pub fn effective_limit(per_dataset_limit: u64, num_reactions: u64) -> u64 {
    if per_dataset_limit > 0 {
        per_dataset_limit
    } else {
        num_reactions
    }
}

/// Keeps only allow-listed datasets, preserving service order.
pub fn select_datasets(datasets: Vec<DatasetDescriptor>, allow_list: Option<&[String]>) -> Vec<DatasetDescriptor> {
    match allow_list {
        Some(ids) if !ids.is_empty() => datasets
            .into_iter()
            .filter(|ds| ids.iter().any(|id| id == &ds.dataset_id))
            .collect(),
        _ => datasets,
    }
}

/// Drives submit, poll, decode and extract for each selected dataset.
///
/// A failing dataset is recorded inline and the run moves on. Only a
/// missing schema or an unreachable dataset listing stops the run.
pub struct OrdScraper {
    queries: QueryClient,
    decoder: RecordDecoder,
    extractor: Extractor,
    schema: Arc<dyn ReactionSchema>,
    dataset_pause: Duration,
}

impl OrdScraper {
    pub fn new(config: ScrapeConfig, schema: Arc<dyn ReactionSchema>) -> Result<Self> {
        let http = HttpClient::new(config.fetch)?;
        Ok(Self {
            queries: QueryClient::new(http, config.poll),
            decoder: RecordDecoder::new(schema.clone()),
            extractor: Extractor::new(config.categories, schema.clone()),
            schema,
            dataset_pause: Duration::from_millis(config.dataset_pause_ms),
        })
    }

    pub async fn run(&self, options: &ScrapeOptions) -> Result<Vec<ScrapeRecord>> {
        self.schema.ensure_available()?;

        info!("Fetching list of all datasets...");
        let datasets = self.queries.list_datasets().await?;
        let datasets = select_datasets(datasets, options.dataset_ids.as_deref());
        info!("Found {} datasets matching criteria.", datasets.len());

        let mut results = Vec::new();
        let mut processed = 0usize;

        for dataset in &datasets {
            if options.max_datasets.is_some_and(|max| processed >= max) {
                break;
            }

            info!(
                "[{}] Processing: {} ({} total reactions)",
                processed + 1,
                dataset.dataset_id,
                dataset.num_reactions
            );

            match self.scrape_dataset(dataset, options.per_dataset_limit, &mut results).await {
                Ok(count) => {
                    processed += 1;
                    info!("Extracted {} reactions from {}", count, dataset.dataset_id);
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!("Error during dataset {} processing: {}", dataset.dataset_id, e);
                    results.push(ScrapeRecord::DatasetError {
                        dataset_id: dataset.dataset_id.clone(),
                        error: e.to_string(),
                    });
                }
            }

            tokio::time::sleep(self.dataset_pause).await;
        }

        Ok(results)
    }

    // Records extracted before a failure stay in `results`.
    async fn scrape_dataset(
        &self,
        dataset: &DatasetDescriptor,
        per_dataset_limit: u64,
        results: &mut Vec<ScrapeRecord>,
    ) -> Result<usize> {
        let limit = effective_limit(per_dataset_limit, dataset.num_reactions);
        let task_id = self.queries.submit(&dataset.dataset_id, limit).await?;
        let envelopes = self.queries.poll(&task_id).await?;
        info!("Retrieved {} reactions for parsing", envelopes.len());

        let mut count = 0;
        for envelope in &envelopes {
            let Some(payload) = envelope.payload()? else {
                continue;
            };
            let reaction = self.decoder.decode(payload)?;
            results.push(self.extractor.extract(&reaction, &dataset.dataset_id));
            count += 1;
        }

        Ok(count)
    }
}
