//! Behavior tree core: tasks, the tick driver, and composites.
//!
//! A tree is built from `Arc<dyn Node>` values and run by calling
//! [`Node::tick`] on the root with an empty [`Blackboard`]. A tick is one
//! complete, run-to-completion invocation of a node; it always produces a
//! [`Status`]. Errors raised by a node's `update` are coerced to
//! `Status::Failed` at the tick boundary and never propagate upward.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

pub mod blackboard;
pub mod composite;
pub mod leaf;

pub use blackboard::Blackboard;
pub use composite::{Children, Parallel, Repeater, RepeaterConfig, Selector, Sequence};
pub use leaf::{Failer, Succeeder};

/// Outcome of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Succeeded,
    Failed,
}

impl Status {
    pub fn is_success(self) -> bool {
        matches!(self, Status::Succeeded)
    }
}

/// Error type returned by a node's `update`.
pub type NodeError = Box<dyn std::error::Error + Send + Sync>;

/// Construction parameters shared by the plain composites and the
/// constant leaves.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeConfig {
    /// Display name; defaults to the node's type name.
    pub name: Option<String>,
}

/// Identity carried by every node: a per-instance id generated at
/// construction plus a human-readable name.
#[derive(Debug, Clone)]
pub struct NodeMeta {
    id: String,
    name: String,
}

impl NodeMeta {
    /// Create a fresh identity. `name` falls back to the node's type name.
    pub fn new(type_name: &str, name: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string(),
            name: name.unwrap_or_else(|| type_name.to_string()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display identity recorded into the blackboard: `name:id-prefix`.
    pub fn label(&self) -> String {
        format!("{}:{}", self.name, &self.id[..9])
    }
}

/// Base contract for every task in a tree.
///
/// Concrete nodes implement [`Node::update`]; callers invoke
/// [`Node::tick`], which wraps `update` with blackboard bookkeeping and
/// error trapping.
#[async_trait]
pub trait Node: Send + Sync {
    fn meta(&self) -> &NodeMeta;

    /// Domain or flow logic. Composites tick their children here; leaves do
    /// real work. `data` is this node's own-data board, shared with every
    /// sibling under the same parent.
    async fn update(&self, data: Blackboard) -> Result<Status, NodeError>;

    /// Run this task to completion.
    ///
    /// Creates the node's record under its id inside `scratch`, delegates
    /// to [`Node::update`] with the nested own-data board, and records the
    /// outcome. Never fails: an `Err` from `update` is logged, written into
    /// the record, and reported as `Status::Failed`. Re-ticking reuses the
    /// same own-data board; it is not reset between ticks.
    async fn tick(&self, scratch: Blackboard) -> Status {
        let record = scratch.board(self.meta().id());
        record.set("node", json!(self.meta().label()));
        let data = record.board("data");

        let status = match self.update(data).await {
            Ok(status) => status,
            Err(err) => {
                warn!(node = %self.meta().label(), error = %err, "update failed");
                record.set("error", json!(err.to_string()));
                Status::Failed
            }
        };

        record.set("status", json!(status));
        status
    }
}

impl std::fmt::Debug for dyn Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.meta().name())
            .field("id", &self.meta().id())
            .finish()
    }
}
