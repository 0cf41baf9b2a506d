//! Composite nodes: ordered, selective, and concurrent child execution.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::debug;

use crate::{Blackboard, Node, NodeConfig, NodeError, NodeMeta, Status};

/// Ordered list of child nodes.
///
/// Construction order is execution order for [`Sequence`] and [`Selector`]
/// and is preserved. Children are held behind `Arc` because [`Parallel`]
/// detaches child ticks onto the runtime; structurally each node still has
/// exactly one parent.
#[derive(Default)]
pub struct Children(Vec<Arc<dyn Node>>);

impl Children {
    pub fn new(children: impl IntoIterator<Item = Arc<dyn Node>>) -> Self {
        Self(children.into_iter().collect())
    }

    /// Append a child, preserving order.
    pub fn add(&mut self, node: Arc<dyn Node>) {
        self.0.push(node);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Node>> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Fan out one concurrent tick of every child, reporting over a channel so
/// the caller can stop waiting at the first failure. Shared by
/// [`Parallel`] and [`Repeater`].
///
/// Children left running after an early return are not joined or
/// cancelled: they finish in the background and their ticks still record
/// into the shared board. A child task that panics drops its sender
/// without reporting, which counts as a failure.
async fn fan_out(children: &Children, data: &Blackboard) -> Status {
    let (tx, mut rx) = mpsc::unbounded_channel();
    for child in children.iter() {
        let child = Arc::clone(child);
        let data = data.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(child.tick(data).await);
        });
    }
    drop(tx);

    let mut remaining = children.len();
    while let Some(status) = rx.recv().await {
        if status == Status::Failed {
            return Status::Failed;
        }
        remaining -= 1;
    }

    if remaining == 0 {
        Status::Succeeded
    } else {
        Status::Failed
    }
}

/// Ticks children in order until one fails; all must succeed.
pub struct Sequence {
    meta: NodeMeta,
    children: Children,
}

impl Sequence {
    pub fn new(children: impl IntoIterator<Item = Arc<dyn Node>>) -> Self {
        Self::with_config(NodeConfig::default(), children)
    }

    pub fn with_config(
        config: NodeConfig,
        children: impl IntoIterator<Item = Arc<dyn Node>>,
    ) -> Self {
        Self {
            meta: NodeMeta::new("Sequence", config.name),
            children: Children::new(children),
        }
    }

    pub fn add(&mut self, node: Arc<dyn Node>) {
        self.children.add(node);
    }
}

#[async_trait]
impl Node for Sequence {
    fn meta(&self) -> &NodeMeta {
        &self.meta
    }

    async fn update(&self, data: Blackboard) -> Result<Status, NodeError> {
        for child in self.children.iter() {
            if child.tick(data.clone()).await == Status::Failed {
                return Ok(Status::Failed);
            }
        }
        Ok(Status::Succeeded)
    }
}

/// Ticks children in order until one succeeds; the first success wins.
pub struct Selector {
    meta: NodeMeta,
    children: Children,
}

impl Selector {
    pub fn new(children: impl IntoIterator<Item = Arc<dyn Node>>) -> Self {
        Self::with_config(NodeConfig::default(), children)
    }

    pub fn with_config(
        config: NodeConfig,
        children: impl IntoIterator<Item = Arc<dyn Node>>,
    ) -> Self {
        Self {
            meta: NodeMeta::new("Selector", config.name),
            children: Children::new(children),
        }
    }

    pub fn add(&mut self, node: Arc<dyn Node>) {
        self.children.add(node);
    }
}

#[async_trait]
impl Node for Selector {
    fn meta(&self) -> &NodeMeta {
        &self.meta
    }

    async fn update(&self, data: Blackboard) -> Result<Status, NodeError> {
        for child in self.children.iter() {
            if child.tick(data.clone()).await == Status::Succeeded {
                return Ok(Status::Succeeded);
            }
        }
        Ok(Status::Failed)
    }
}

/// Ticks all children concurrently; the first failure wins.
///
/// When a child fails, `update` returns `Failed` immediately and the
/// remaining children keep running detached in the background, still
/// writing into the shared own-data board. Nothing cancels them; their
/// records finalize whenever they finish.
pub struct Parallel {
    meta: NodeMeta,
    children: Children,
}

impl Parallel {
    pub fn new(children: impl IntoIterator<Item = Arc<dyn Node>>) -> Self {
        Self::with_config(NodeConfig::default(), children)
    }

    pub fn with_config(
        config: NodeConfig,
        children: impl IntoIterator<Item = Arc<dyn Node>>,
    ) -> Self {
        Self {
            meta: NodeMeta::new("Parallel", config.name),
            children: Children::new(children),
        }
    }

    pub fn add(&mut self, node: Arc<dyn Node>) {
        self.children.add(node);
    }
}

#[async_trait]
impl Node for Parallel {
    fn meta(&self) -> &NodeMeta {
        &self.meta
    }

    async fn update(&self, data: Blackboard) -> Result<Status, NodeError> {
        Ok(fan_out(&self.children, &data).await)
    }
}

/// Construction parameters for [`Repeater`].
#[derive(Debug, Clone, Deserialize)]
pub struct RepeaterConfig {
    pub name: Option<String>,
    /// Number of full attempts before giving up.
    #[serde(default = "default_count")]
    pub count: usize,
}

fn default_count() -> usize {
    1
}

impl Default for RepeaterConfig {
    fn default() -> Self {
        Self {
            name: None,
            count: default_count(),
        }
    }
}

/// Bounded retry over the [`Parallel`] fan-out.
///
/// Every attempt re-ticks all children against the same own-data board, so
/// state a child keeps there accumulates across attempts. The first
/// successful attempt wins; `Failed` only after every attempt fails.
pub struct Repeater {
    meta: NodeMeta,
    children: Children,
    count: usize,
}

impl Repeater {
    pub fn new(count: usize, children: impl IntoIterator<Item = Arc<dyn Node>>) -> Self {
        Self::with_config(
            RepeaterConfig {
                name: None,
                count,
            },
            children,
        )
    }

    pub fn with_config(
        config: RepeaterConfig,
        children: impl IntoIterator<Item = Arc<dyn Node>>,
    ) -> Self {
        Self {
            meta: NodeMeta::new("Repeater", config.name),
            children: Children::new(children),
            count: config.count,
        }
    }

    pub fn add(&mut self, node: Arc<dyn Node>) {
        self.children.add(node);
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

#[async_trait]
impl Node for Repeater {
    fn meta(&self) -> &NodeMeta {
        &self.meta
    }

    async fn update(&self, data: Blackboard) -> Result<Status, NodeError> {
        for attempt in 1..=self.count {
            if fan_out(&self.children, &data).await == Status::Succeeded {
                return Ok(Status::Succeeded);
            }
            debug!(node = %self.meta.label(), attempt, "attempt failed");
        }
        Ok(Status::Failed)
    }
}
