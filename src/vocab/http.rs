//! Blocking HTTP transport for a SPARQL 1.1 query endpoint.

use super::error::VocabError;
use super::sparql::{parse_results_json, BindingRow, SparqlEndpoint};
use crate::config::Settings;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, USER_AGENT};
use std::time::Duration;

const RESULTS_JSON: &str = "application/sparql-results+json";

#[derive(Debug, Clone)]
pub struct HttpEndpoint {
    url: String,
    client: Client,
}

impl HttpEndpoint {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, VocabError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VocabError::Transport(format!("failed to build http client: {e}")))?;
        Ok(Self { url: url.into(), client })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, VocabError> {
        Self::new(&settings.endpoint, Duration::from_secs(settings.timeout_secs))
    }
}

impl SparqlEndpoint for HttpEndpoint {
    fn execute_query(&self, query: &str) -> Result<Vec<BindingRow>, VocabError> {
        let response = self
            .client
            .post(&self.url)
            .header(ACCEPT, RESULTS_JSON)
            .header(USER_AGENT, concat!("lca_vocab_core/", env!("CARGO_PKG_VERSION")))
            .form(&[("query", query)])
            .send()
            .map_err(|e| VocabError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(VocabError::Http { endpoint: self.url.clone(), status: status.as_u16() });
        }
        let body = response.text().map_err(|e| VocabError::Transport(e.to_string()))?;
        parse_results_json(&body)
    }

    fn location(&self) -> &str {
        &self.url
    }
}
