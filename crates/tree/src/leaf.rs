//! Constant-outcome leaves, useful as placeholders and selector fallbacks.

use async_trait::async_trait;

use crate::{Blackboard, Node, NodeConfig, NodeError, NodeMeta, Status};

/// Always succeeds.
pub struct Succeeder {
    meta: NodeMeta,
}

impl Succeeder {
    pub fn new() -> Self {
        Self::with_config(NodeConfig::default())
    }

    pub fn with_config(config: NodeConfig) -> Self {
        Self {
            meta: NodeMeta::new("Succeeder", config.name),
        }
    }
}

impl Default for Succeeder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Node for Succeeder {
    fn meta(&self) -> &NodeMeta {
        &self.meta
    }

    async fn update(&self, _data: Blackboard) -> Result<Status, NodeError> {
        Ok(Status::Succeeded)
    }
}

/// Always fails.
pub struct Failer {
    meta: NodeMeta,
}

impl Failer {
    pub fn new() -> Self {
        Self::with_config(NodeConfig::default())
    }

    pub fn with_config(config: NodeConfig) -> Self {
        Self {
            meta: NodeMeta::new("Failer", config.name),
        }
    }
}

impl Default for Failer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Node for Failer {
    fn meta(&self) -> &NodeMeta {
        &self.meta
    }

    async fn update(&self, _data: Blackboard) -> Result<Status, NodeError> {
        Ok(Status::Failed)
    }
}
