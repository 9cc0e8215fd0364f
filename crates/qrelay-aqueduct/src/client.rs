//! Aqueduct HTTP client.
//!
//! Experiments are looked up through the GraphQL endpoint; files move over
//! the REST file API:
//!
//! | Operation | Request |
//! |-----------|---------|
//! | lookup | `POST {url}/graphql` |
//! | download | `GET {url}/api/files/{uuid}/{file_name}` |
//! | upload | `POST {url}/api/files/{uuid}` (multipart, part `file`) |

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode, Url, header};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::error::{AqueductError, AqueductResult};
use crate::store::{Experiment, ExperimentStore};

/// Environment variable holding the bearer token.
pub const TOKEN_ENV: &str = "API_TOKEN";

const EXPERIMENT_QUERY: &str = "query Experiment($value: String!) { \
     experiment(type: EID, value: $value) { uuid eid title } }";

/// Client for one Aqueduct server.
pub struct AqueductClient {
    client: Client,
    base: Url,
    authenticated: bool,
}

impl fmt::Debug for AqueductClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AqueductClient")
            .field("url", &self.base.as_str())
            .field("token", &if self.authenticated { "[REDACTED]" } else { "none" })
            .finish()
    }
}

impl AqueductClient {
    /// Create a client for `url`, optionally sending a bearer token.
    pub fn new(url: &str, token: Option<&str>, timeout: Duration) -> AqueductResult<Self> {
        let base = Url::parse(url).map_err(|_| AqueductError::InvalidUrl(url.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(AqueductError::InvalidUrl(url.to_string()));
        }

        let mut headers = header::HeaderMap::new();
        if let Some(token) = token {
            let mut value = header::HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| AqueductError::InvalidToken)?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base,
            authenticated: token.is_some(),
        })
    }

    /// Create a client taking the token from `API_TOKEN`, if set.
    pub fn from_env(url: &str, timeout: Duration) -> AqueductResult<Self> {
        let token = std::env::var(TOKEN_ENV).ok().filter(|t| !t.is_empty());
        Self::new(url, token.as_deref(), timeout)
    }

    /// `{base}/seg1/seg2/...` with every segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> AqueductResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| AqueductError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl ExperimentStore for AqueductClient {
    async fn experiment_by_eid(&self, eid: &str) -> AqueductResult<Experiment> {
        let url = self.endpoint(&["graphql"])?;
        debug!("Looking up experiment {} at {}", eid, url);

        let response = self
            .client
            .post(url)
            .json(&json!({
                "query": EXPERIMENT_QUERY,
                "variables": { "value": eid },
            }))
            .send()
            .await?;
        let response = check_status(response, || format!("experiment '{eid}'")).await?;
        let body: GraphQlResponse = response.json().await?;
        body.into_experiment(eid)
    }

    async fn download_file(
        &self,
        experiment: &Experiment,
        file_name: &str,
        directory: &Path,
    ) -> AqueductResult<PathBuf> {
        let url = self.endpoint(&["api", "files", &experiment.uuid, file_name])?;
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let response = check_status(response, || {
            format!("file '{file_name}' in experiment '{}'", experiment.eid)
        })
        .await?;
        let bytes = response.bytes().await?;

        let path = directory.join(file_name);
        tokio::fs::write(&path, &bytes).await?;
        Ok(path)
    }

    async fn upload_file(&self, experiment: &Experiment, path: &Path) -> AqueductResult<()> {
        let file_name = base_name(path)?;
        let url = self.endpoint(&["api", "files", &experiment.uuid])?;
        debug!("POST {} ({})", url, file_name);

        let bytes = tokio::fs::read(path).await?;
        let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name));

        let response = self.client.post(url).multipart(form).send().await?;
        check_status(response, || format!("experiment '{}'", experiment.eid)).await?;
        Ok(())
    }
}

/// Base name of a local file as a UTF-8 string.
pub(crate) fn base_name(path: &Path) -> AqueductResult<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| AqueductError::Format(format!("'{}' has no file name", path.display())))
}

/// Map 404 to `NotFound` and any other failure status to `Api`.
async fn check_status(
    response: reqwest::Response,
    what: impl FnOnce() -> String,
) -> AqueductResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(AqueductError::NotFound(what()));
    }
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "no body".to_string());
    Err(AqueductError::Api {
        status: status.as_u16(),
        message,
    })
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<ExperimentData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct ExperimentData {
    experiment: Option<Experiment>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

impl GraphQlResponse {
    /// A null experiment or any GraphQL error means the EID did not resolve.
    fn into_experiment(self, eid: &str) -> AqueductResult<Experiment> {
        if !self.errors.is_empty() {
            let messages: Vec<_> = self.errors.into_iter().map(|e| e.message).collect();
            return Err(AqueductError::NotFound(format!(
                "experiment '{eid}': {}",
                messages.join("; ")
            )));
        }
        self.data
            .and_then(|d| d.experiment)
            .ok_or_else(|| AqueductError::NotFound(format!("experiment '{eid}'")))
    }
}
