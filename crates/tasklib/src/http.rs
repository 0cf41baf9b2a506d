//! HTTP leaf task.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use arbor_tree::{Blackboard, Node, NodeError, NodeMeta, Status};

/// Construction parameters for [`RequestTask`].
#[derive(Debug, Clone, Deserialize)]
pub struct RequestConfig {
    pub url: String,
    pub name: Option<String>,
}

/// Issues a GET request and records the response into the node's own-data.
///
/// The client is injected at construction so that every HTTP leaf in a
/// tree shares one connection pool. Any response the server returns is
/// recorded and counts as task success, whatever its status code; only
/// transport failures fail the task.
pub struct RequestTask {
    meta: NodeMeta,
    url: String,
    client: reqwest::Client,
}

impl RequestTask {
    pub fn new(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self::with_config(
            RequestConfig {
                url: url.into(),
                name: None,
            },
            client,
        )
    }

    pub fn with_config(config: RequestConfig, client: reqwest::Client) -> Self {
        Self {
            meta: NodeMeta::new("RequestTask", config.name),
            url: config.url,
            client,
        }
    }
}

#[async_trait]
impl Node for RequestTask {
    fn meta(&self) -> &NodeMeta {
        &self.meta
    }

    async fn update(&self, data: Blackboard) -> Result<Status, NodeError> {
        data.set("url", json!(self.url));
        debug!(url = %self.url, "issuing request");

        let response = self.client.get(&self.url).send().await?;
        data.set("status", json!(response.status().as_u16()));
        data.set("final_url", json!(response.url().as_str()));

        let body = response.text().await?;
        data.set("body", json!(body));

        Ok(Status::Succeeded)
    }
}
