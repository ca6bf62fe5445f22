use async_trait::async_trait;
use log::debug;
use reqwest::Client as HttpClient;
use serde::{ Deserialize, Serialize };

use super::filter::PATH_FIELD;
use super::{ DocumentSearch, EmployeeScope, SearchError, SearchResult };
use crate::cli::Args;

pub const DEFAULT_API_VERSION: &str = "2023-11-01";

pub struct AzureSearchClient {
    http: HttpClient,
    endpoint: String,
    index_name: String,
    api_key: String,
    api_version: String,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    search: &'a str,
    filter: String,
    select: String,
    top: usize,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    value: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    content: Option<String>,
    metadata_storage_path: Option<String>,
}

impl From<SearchHit> for SearchResult {
    fn from(hit: SearchHit) -> Self {
        SearchResult {
            content: hit.content.unwrap_or_default(),
            source: hit.metadata_storage_path.unwrap_or_default(),
        }
    }
}

impl AzureSearchClient {
    pub fn new(
        endpoint: String,
        index_name: String,
        api_key: String,
        api_version: Option<String>
    ) -> Self {
        Self {
            http: HttpClient::new(),
            endpoint,
            index_name,
            api_key,
            api_version: api_version.unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
        }
    }

    pub fn from_args(args: &Args) -> Self {
        Self::new(
            args.search_endpoint.clone(),
            args.search_index_name.clone(),
            args.search_api_key.clone(),
            Some(args.search_api_version.clone()).filter(|v| !v.is_empty())
        )
    }

    fn url(&self) -> String {
        format!("{}/indexes/{}/docs/search", self.endpoint.trim_end_matches('/'), self.index_name)
    }
}

#[async_trait]
impl DocumentSearch for AzureSearchClient {
    async fn search(
        &self,
        scope: &EmployeeScope,
        query: &str,
        top: usize
    ) -> Result<Vec<SearchResult>, SearchError> {
        let req = SearchRequest {
            search: query,
            filter: scope.filter(),
            select: format!("content,{}", PATH_FIELD),
            top,
        };

        let resp = self.http
            .post(self.url())
            .query(&[("api-version", self.api_version.as_str())])
            .header("api-key", &self.api_key)
            .json(&req)
            .send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SearchError::Status { status, body });
        }

        let data = resp.json::<SearchResponse>().await?;
        debug!("Search returned {} hit(s) under {}", data.value.len(), scope);

        Ok(data.value.into_iter().map(SearchResult::from).collect())
    }
}
