//! Socrata (SODA 2.x) data source
//!
//! Pages are requested as
//! `GET {root}/resource/{dataset}.json?$select=..&$where=..&$group=..&$limit=..&$offset=..`.

use super::types::{DataSource, SoqlQuery};
use crate::config::SourceConfig;
use crate::decode::{JsonDecoder, RecordDecoder};
use crate::error::Result;
use crate::http::{HttpClient, HttpClientConfig, RequestConfig};
use crate::types::Record;
use async_trait::async_trait;
use url::Url;

/// Data source backed by a Socrata resource endpoint
#[derive(Debug)]
pub struct SocrataSource {
    client: HttpClient,
    resource_url: Url,
    decoder: JsonDecoder,
}

impl SocrataSource {
    /// Create a source from configuration
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let http_config = HttpClientConfig::builder()
            .timeout(config.timeout())
            .header("Accept", "application/json")
            .build();
        let client = HttpClient::with_config(http_config)?;
        Self::with_client(client, &config.resource_url())
    }

    /// Create a source with an existing client
    pub fn with_client(client: HttpClient, resource_url: &str) -> Result<Self> {
        Ok(Self {
            client,
            resource_url: Url::parse(resource_url)?,
            decoder: JsonDecoder::new(),
        })
    }

    /// The dataset resource URL
    pub fn resource_url(&self) -> &Url {
        &self.resource_url
    }
}

#[async_trait]
impl DataSource for SocrataSource {
    async fn fetch_page(&self, query: &SoqlQuery, limit: u32, offset: u64) -> Result<Vec<Record>> {
        let mut request = RequestConfig::new();
        for (key, value) in query.params() {
            request = request.query(key, value);
        }
        request = request
            .query("$limit", limit.to_string())
            .query("$offset", offset.to_string());

        let body = self
            .client
            .get_text(self.resource_url.as_str(), &request)
            .await?;
        self.decoder.decode(&body)
    }
}
