pub mod azure;
pub mod filter;

use async_trait::async_trait;

pub use self::azure::AzureSearchClient;
pub use self::filter::EmployeeScope;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub content: String,
    pub source: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("search service returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

#[async_trait]
pub trait DocumentSearch: Send + Sync {
    async fn search(
        &self,
        scope: &EmployeeScope,
        query: &str,
        top: usize
    ) -> Result<Vec<SearchResult>, SearchError>;
}
