//! NCBI E-utilities client.
//!
//! Two sequential calls make up a run: `esearch` turns a query into a list of
//! PubMed IDs, `efetch` turns that list into a `PubmedArticleSet` XML document.

use crate::config::Config;
use crate::error::{PubmedError, Result};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// E-utilities client holding one HTTP connection pool and the request settings
pub struct EutilsClient {
    client: reqwest::Client,
    config: Config,
}

impl EutilsClient {
    /// Create a new client from config
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .user_agent(format!("{}/{}", config.tool, env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PubmedError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Search PubMed and return at most `retmax` identifiers, in API order.
    pub async fn search_ids(&self, term: &str) -> Result<Vec<String>> {
        let url = build_search_url(&self.config, term)?;
        debug!(url = %url, "Querying esearch");

        let body = self.get_text(url).await?;
        let mut ids = parse_search_response(&body)?;
        ids.truncate(self.config.retmax);

        info!(query = term, count = ids.len(), "Search complete");
        Ok(ids)
    }

    /// Fetch full records for `ids` as raw XML.
    ///
    /// No request is made for an empty list; the result is then an empty string.
    pub async fn fetch_details(&self, ids: &[String]) -> Result<String> {
        if ids.is_empty() {
            debug!("No identifiers, skipping efetch");
            return Ok(String::new());
        }

        let url = build_fetch_url(&self.config, ids)?;
        debug!(url = %url, "Querying efetch");

        let xml = self.get_text(url).await?;
        info!(count = ids.len(), bytes = xml.len(), "Fetched article details");
        Ok(xml)
    }

    async fn get_text(&self, url: Url) -> Result<String> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PubmedError::Api {
                code: status.as_u16() as i32,
                message: format!("E-utilities error: {}", status),
            });
        }

        Ok(response.text().await?)
    }
}

// === ESearch Response Types ===

#[derive(Debug, Deserialize)]
struct ESearchResponse {
    #[serde(default)]
    esearchresult: ESearchResult,
}

#[derive(Debug, Default, Deserialize)]
struct ESearchResult {
    #[serde(rename = "ERROR", default)]
    error: Option<String>,
    #[serde(default)]
    idlist: Vec<String>,
}

/// Parse an esearch JSON body into its identifier list
fn parse_search_response(body: &str) -> Result<Vec<String>> {
    let response: ESearchResponse = serde_json::from_str(body)?;

    if let Some(message) = response.esearchresult.error {
        return Err(PubmedError::Api { code: 200, message });
    }

    Ok(response.esearchresult.idlist)
}

fn endpoint(config: &Config, name: &str) -> Result<Url> {
    let base = config.base_url.trim_end_matches('/');
    Url::parse(&format!("{}/{}", base, name))
        .map_err(|e| PubmedError::Config(format!("Invalid base URL: {}", e)))
}

/// Append the identification parameters NCBI asks every caller to send
fn append_identity(params: &mut url::form_urlencoded::Serializer<'_, url::UrlQuery<'_>>, config: &Config) {
    params.append_pair("tool", &config.tool);
    if let Some(email) = &config.email {
        params.append_pair("email", email);
    }
    if let Some(api_key) = &config.api_key {
        params.append_pair("api_key", api_key);
    }
}

/// Build the esearch URL
fn build_search_url(config: &Config, term: &str) -> Result<Url> {
    let mut url = endpoint(config, "esearch.fcgi")?;
    {
        let mut params = url.query_pairs_mut();
        params.append_pair("db", "pubmed");
        params.append_pair("term", term);
        params.append_pair("retmode", "json");
        params.append_pair("retmax", &config.retmax.to_string());
        append_identity(&mut params, config);
    }
    Ok(url)
}

/// Build the efetch URL
fn build_fetch_url(config: &Config, ids: &[String]) -> Result<Url> {
    let mut url = endpoint(config, "efetch.fcgi")?;
    {
        let mut params = url.query_pairs_mut();
        params.append_pair("db", "pubmed");
        params.append_pair("id", &ids.join(","));
        params.append_pair("retmode", "xml");
        append_identity(&mut params, config);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query_value(url: &Url, key: &str) -> Option<String> {
        url.query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    #[test]
    fn test_build_search_url() -> Result<()> {
        let config = Config {
            email: Some("me@example.org".to_string()),
            api_key: Some("key".to_string()),
            ..Default::default()
        };
        let url = build_search_url(&config, "cancer immunotherapy 2023")?;

        assert!(url.as_str().starts_with("https://eutils.ncbi.nlm.nih.gov/entrez/eutils/esearch.fcgi?"));
        assert!(url.as_str().contains("term=cancer+immunotherapy+2023"));
        assert_eq!(query_value(&url, "db").as_deref(), Some("pubmed"));
        assert_eq!(query_value(&url, "retmode").as_deref(), Some("json"));
        assert_eq!(query_value(&url, "retmax").as_deref(), Some("10"));
        assert_eq!(query_value(&url, "email").as_deref(), Some("me@example.org"));
        assert_eq!(query_value(&url, "api_key").as_deref(), Some("key"));
        Ok(())
    }

    #[test]
    fn test_build_fetch_url_without_credentials() -> Result<()> {
        let ids = vec!["111".to_string(), "222".to_string()];
        let url = build_fetch_url(&Config::default(), &ids)?;

        assert_eq!(query_value(&url, "id").as_deref(), Some("111,222"));
        assert_eq!(query_value(&url, "retmode").as_deref(), Some("xml"));
        assert!(query_value(&url, "email").is_none());
        assert!(query_value(&url, "api_key").is_none());
        Ok(())
    }

    #[test]
    fn test_parse_search_response() -> Result<()> {
        let body = r#"{"header":{},"esearchresult":{"count":"2","idlist":["38000001","38000002"]}}"#;
        assert_eq!(parse_search_response(body)?, vec!["38000001", "38000002"]);

        let missing = r#"{"header":{}}"#;
        assert!(parse_search_response(missing)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_parse_search_error() {
        let body = r#"{"esearchresult":{"ERROR":"Invalid query"}}"#;
        match parse_search_response(body) {
            Err(PubmedError::Api { message, .. }) => assert_eq!(message, "Invalid query"),
            other => panic!("expected API error, got {:?}", other),
        }
    }
}
