//! Data server catalog client.
//!
//! The data server publishes three JSON documents per dataset:
//!
//! - `<server>/datasets.json`: dataset names
//! - `<server>/<dataset>/instances.json`: instances, newest last
//! - `<server>/<dataset>/<instance>/meta.json`: variables and other metadata

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

use wx_common::{WxError, WxResult};

use crate::select::SelectOption;

/// Catalog of datasets available on a data server.
#[async_trait]
pub trait DataServer: Send + Sync {
    async fn datasets(&self) -> WxResult<Vec<String>>;

    async fn instances(&self, dataset: &str) -> WxResult<Vec<String>>;

    async fn meta(&self, dataset: &str, instance: &str) -> WxResult<DatasetMeta>;
}

/// Contents of `meta.json`. Only `variables` is interpreted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetMeta {
    pub variables: Vec<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// HTTP data server.
pub struct HttpDataServer {
    client: Client,
    base_url: String,
}

impl HttpDataServer {
    pub fn new(base_url: &str) -> WxResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| WxError::FetchError {
                url: base_url.to_string(),
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn fetch_json<T: DeserializeOwned>(&self, url: String) -> WxResult<T> {
        debug!(url = %url, "Fetching catalog document");

        let fetch_error = |message: String| WxError::FetchError {
            url: url.clone(),
            message,
        };

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        if !response.status().is_success() {
            return Err(fetch_error(format!("HTTP {}", response.status())));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| WxError::JsonError(format!("{}: {}", url, e)))
    }
}

#[async_trait]
impl DataServer for HttpDataServer {
    #[instrument(skip(self), fields(server = %self.base_url))]
    async fn datasets(&self) -> WxResult<Vec<String>> {
        self.fetch_json(self.url("datasets.json")).await
    }

    #[instrument(skip(self), fields(server = %self.base_url))]
    async fn instances(&self, dataset: &str) -> WxResult<Vec<String>> {
        self.fetch_json(self.url(&format!("{}/instances.json", dataset)))
            .await
    }

    #[instrument(skip(self), fields(server = %self.base_url))]
    async fn meta(&self, dataset: &str, instance: &str) -> WxResult<DatasetMeta> {
        self.fetch_json(self.url(&format!("{}/{}/meta.json", dataset, instance)))
            .await
    }
}

/// Build variable selector entries from a dataset's variables.
///
/// Variables are sorted. Northward components are hidden; an eastward
/// component stands for the whole vector and is labeled with `vector`.
pub fn variable_options(variables: &[String]) -> Vec<SelectOption> {
    let mut sorted: Vec<&String> = variables.iter().collect();
    sorted.sort();
    sorted
        .into_iter()
        .filter(|v| !v.contains("northward"))
        .map(|v| SelectOption::new(v.clone(), v.replacen("eastward", "vector", 1)))
        .collect()
}

/// Variables a layer needs for `variable`: the variable itself, plus the
/// northward twin of an eastward component.
pub fn layer_variables(variable: &str) -> Vec<String> {
    let mut variables = vec![variable.to_string()];
    if variable.contains("eastward") {
        variables.push(variable.replacen("eastward", "northward", 1));
    }
    variables
}

/// Fetch the newest instance of `dataset` and its metadata.
pub async fn latest_meta(server: &dyn DataServer, dataset: &str) -> WxResult<(String, DatasetMeta)> {
    let instances = server.instances(dataset).await?;
    let instance = instances
        .last()
        .cloned()
        .ok_or_else(|| WxError::JsonError(format!("{}: no instances", dataset)))?;
    let meta = server.meta(dataset, &instance).await?;
    Ok((instance, meta))
}
