pub mod types;
pub mod fetcher;
pub mod query;
pub mod schema;
pub mod parser;
pub mod extractor;
pub mod scraper;
pub mod output;

pub use types::*;
pub use fetcher::HttpClient;
pub use query::{classify_poll_response, PollDecision, QueryClient};
pub use schema::{OrdSchema, Reaction, ReactionSchema};
pub use parser::RecordDecoder;
pub use extractor::Extractor;
pub use scraper::{effective_limit, select_datasets, OrdScraper};
pub use output::{read_results, write_results};
