//! HTTP record source speaking the PostgREST query protocol.
//!
//! Each query becomes
//! `GET {base_url}/rest/v1/{collection}?{column}=ilike.*{pattern}*&select=*&limit={limit}`
//! authenticated with the public API key sent both as `apikey` and as a
//! bearer token.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SearchError;
use crate::source::{RecordPage, RecordQuery, RecordSource};
use crate::types::RawRecord;

/// Default User-Agent sent to the record source.
const DEFAULT_USER_AGENT: &str = concat!("company-search/", env!("CARGO_PKG_VERSION"));

/// Path prefix of the REST endpoint below the base URL.
const REST_PATH: &str = "rest/v1/";

/// Connection settings for [`RestRecordSource`].
///
/// Credentials are optional here so that a missing value can be reported
/// as a configuration error at search time instead of at construction.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestSourceConfig {
    /// Project base URL, e.g. `https://example.supabase.co`.
    pub base_url: Option<String>,
    /// Public API key. Sent as `apikey` and as the bearer token.
    pub api_key: Option<String>,
    /// Custom User-Agent. If `None`, a crate-versioned default is used.
    pub user_agent: Option<String>,
    /// HTTP-level timeout in milliseconds. If `None`, only the
    /// orchestrator's per-source budget applies.
    pub timeout_ms: Option<u64>,
}

impl fmt::Debug for RestSourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestSourceConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("user_agent", &self.user_agent)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl RestSourceConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
            api_key: Some(api_key.into()),
            ..Default::default()
        }
    }

    /// Whether both the base URL and the API key are present and non-blank.
    pub fn has_credentials(&self) -> bool {
        non_blank(self.base_url.as_deref()).is_some() && non_blank(self.api_key.as_deref()).is_some()
    }
}

/// Build a [`reqwest::Client`] for the record source.
///
/// # Errors
///
/// Returns [`SearchError::Http`] if the client cannot be constructed.
pub fn build_client(config: &RestSourceConfig) -> Result<reqwest::Client, SearchError> {
    let ua = config
        .user_agent
        .clone()
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned());

    let mut builder = reqwest::Client::builder().user_agent(ua);
    if let Some(ms) = config.timeout_ms {
        builder = builder.timeout(Duration::from_millis(ms));
    }
    builder
        .build()
        .map_err(|e| SearchError::Http(format!("failed to build HTTP client: {e}")))
}

/// [`RecordSource`] backed by a PostgREST-compatible HTTP API.
pub struct RestRecordSource {
    config: RestSourceConfig,
    client: reqwest::Client,
}

impl RestRecordSource {
    /// Create a source from `config`. Credentials are checked per search.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn new(config: RestSourceConfig) -> Result<Self, SearchError> {
        let client = build_client(&config)?;
        Ok(Self { config, client })
    }

    fn credentials(&self) -> Result<(url::Url, &str), SearchError> {
        let base = non_blank(self.config.base_url.as_deref()).ok_or_else(|| {
            SearchError::Config(
                "record source URL is not configured; set SUPABASE_URL".into(),
            )
        })?;
        let key = non_blank(self.config.api_key.as_deref()).ok_or_else(|| {
            SearchError::Config(
                "record source API key is not configured; set SUPABASE_ANON_KEY".into(),
            )
        })?;

        // A trailing slash keeps `join` from replacing the last path segment.
        let normalised = if base.ends_with('/') {
            base.to_owned()
        } else {
            format!("{base}/")
        };
        let url = url::Url::parse(&normalised)
            .map_err(|e| SearchError::Config(format!("invalid record source URL: {e}")))?;
        Ok((url, key))
    }

    fn collection_url(base: &url::Url, collection: &str) -> Result<url::Url, SearchError> {
        base.join(REST_PATH)
            .and_then(|rest| rest.join(collection))
            .map_err(|e| SearchError::Config(format!("invalid collection {collection}: {e}")))
    }
}

impl RecordSource for RestRecordSource {
    async fn fetch(&self, query: &RecordQuery) -> Result<RecordPage, SearchError> {
        let (base, key) = self.credentials()?;
        let url = Self::collection_url(&base, &query.collection)?;
        let filter = format!("ilike.*{}*", query.pattern);
        let limit = query.limit.to_string();

        let response = self
            .client
            .get(url)
            .query(&[
                (query.column.as_str(), filter.as_str()),
                ("select", "*"),
                ("limit", limit.as_str()),
            ])
            .header("apikey", key)
            .bearer_auth(key)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| SearchError::Http(format!("{}: {e}", query.collection)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Http(format!(
                "{} returned HTTP {}",
                query.collection,
                status.as_u16()
            )));
        }

        let total_count = response
            .headers()
            .get(reqwest::header::CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_total_count);

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| SearchError::Parse(format!("{}: {e}", query.collection)))?;

        let rows = parse_rows(body)
            .map_err(|msg| SearchError::Parse(format!("{}: {msg}", query.collection)))?;

        Ok(RecordPage { rows, total_count })
    }

    fn check_configured(&self) -> Result<(), SearchError> {
        self.credentials().map(|_| ())
    }
}

/// Decode a JSON array of row objects.
fn parse_rows(body: serde_json::Value) -> Result<Vec<RawRecord>, String> {
    let serde_json::Value::Array(items) = body else {
        return Err("expected a JSON array of rows".into());
    };
    items
        .into_iter()
        .map(|item| match item {
            serde_json::Value::Object(object) => Ok(RawRecord::from_json_object(object)),
            _ => Err("expected every row to be a JSON object".into()),
        })
        .collect()
}

/// Parse the total from a `Content-Range` header such as `0-24/3573`.
///
/// Returns `None` for an unknown total (`*`) or a malformed header.
pub fn parse_total_count(header: &str) -> Option<u64> {
    let (_, total) = header.rsplit_once('/')?;
    total.trim().parse().ok()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_client_with_default_config() {
        assert!(build_client(&RestSourceConfig::default()).is_ok());
    }

    #[test]
    fn build_client_with_custom_ua_and_timeout() {
        let config = RestSourceConfig {
            user_agent: Some("CustomBot/1.0".into()),
            timeout_ms: Some(2_000),
            ..Default::default()
        };
        assert!(build_client(&config).is_ok());
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = RestSourceConfig::new("https://db.example.com", "secret-key");
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("[REDACTED]"));
        assert!(debug.contains("db.example.com"));
    }

    #[test]
    fn has_credentials_requires_both_values() {
        assert!(RestSourceConfig::new("https://db.example.com", "key").has_credentials());
        assert!(!RestSourceConfig::new("https://db.example.com", "  ").has_credentials());
        assert!(!RestSourceConfig::default().has_credentials());
    }

    #[test]
    fn missing_url_is_config_error() {
        let source = RestRecordSource::new(RestSourceConfig {
            api_key: Some("key".into()),
            ..Default::default()
        })
        .expect("client");
        let err = source.check_configured().unwrap_err();
        assert!(matches!(err, SearchError::Config(_)));
        assert!(err.to_string().contains("SUPABASE_URL"));
    }

    #[test]
    fn missing_key_is_config_error() {
        let source = RestRecordSource::new(RestSourceConfig {
            base_url: Some("https://db.example.com".into()),
            ..Default::default()
        })
        .expect("client");
        let err = source.check_configured().unwrap_err();
        assert!(err.to_string().contains("SUPABASE_ANON_KEY"));
    }

    #[test]
    fn invalid_url_is_config_error() {
        let source =
            RestRecordSource::new(RestSourceConfig::new("not a url", "key")).expect("client");
        assert!(matches!(
            source.check_configured(),
            Err(SearchError::Config(_))
        ));
    }

    #[test]
    fn collection_url_appends_rest_path() {
        for base in ["https://db.example.com", "https://db.example.com/"] {
            let source = RestRecordSource::new(RestSourceConfig::new(base, "key")).expect("client");
            let (url, _) = source.credentials().expect("credentials");
            let full = RestRecordSource::collection_url(&url, "eib_approved").expect("url");
            assert_eq!(full.as_str(), "https://db.example.com/rest/v1/eib_approved");
        }
    }

    #[test]
    fn total_count_parsed_from_content_range() {
        assert_eq!(parse_total_count("0-24/3573"), Some(3573));
        assert_eq!(parse_total_count("*/0"), Some(0));
        assert_eq!(parse_total_count("0-24/*"), None);
        assert_eq!(parse_total_count("garbage"), None);
    }

    #[test]
    fn rows_must_be_array_of_objects() {
        let rows = parse_rows(serde_json::json!([{"company_name": "A"}, {"company_name": "B"}]))
            .expect("rows");
        assert_eq!(rows.len(), 2);
        assert!(parse_rows(serde_json::json!({"message": "oops"})).is_err());
        assert!(parse_rows(serde_json::json!([1, 2])).is_err());
    }
}
