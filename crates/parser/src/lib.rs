//! Builds task trees from declarative JSON definitions.
//!
//! A definition is a recursive record:
//!
//! ```json
//! { "task": "Sequence", "args": { "name": "ship", "children": [ ... ] } }
//! ```
//!
//! The [`Registry`] maps task type names to factories; children are built
//! depth-first and handed to the parent's factory already constructed, so
//! the tree core never performs any lookup itself.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use arbor_tasklib::{CmdConfig, CmdTask, RequestConfig, RequestTask};
use arbor_tree::{
    Failer, Node, NodeConfig, Parallel, Repeater, RepeaterConfig, Selector, Sequence, Succeeder,
};

/// Errors raised while building a tree from a definition. Construction
/// either yields a valid node or fails here, before any tick happens.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("unknown task type: {0}")]
    UnknownTask(String),

    #[error("bad arguments for task {task}: {source}")]
    BadArgs {
        task: String,
        source: serde_json::Error,
    },

    #[error("malformed definition: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// One record in a task definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDef {
    pub task: String,
    #[serde(default)]
    pub args: serde_json::Map<String, Value>,
}

type Factory =
    Box<dyn Fn(Value, Vec<Arc<dyn Node>>) -> Result<Arc<dyn Node>, ParseError> + Send + Sync>;

fn from_args<T: serde::de::DeserializeOwned>(task: &str, args: Value) -> Result<T, ParseError> {
    serde_json::from_value(args).map_err(|source| ParseError::BadArgs {
        task: task.to_string(),
        source,
    })
}

/// Maps task type names to node factories.
///
/// `Registry::default()` knows every built-in task type; callers can
/// [`register`](Registry::register) their own. The registry also owns the
/// HTTP client shared by every `RequestTask` it builds.
pub struct Registry {
    factories: HashMap<String, Factory>,
    client: reqwest::Client,
}

impl Registry {
    /// An empty registry with no task types.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
            client: reqwest::Client::new(),
        }
    }

    /// The HTTP client injected into HTTP leaves built by this registry.
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Register a factory for `type_name`, replacing any previous one.
    pub fn register<F>(&mut self, type_name: impl Into<String>, factory: F)
    where
        F: Fn(Value, Vec<Arc<dyn Node>>) -> Result<Arc<dyn Node>, ParseError>
            + Send
            + Sync
            + 'static,
    {
        self.factories.insert(type_name.into(), Box::new(factory));
    }

    pub fn has(&self, type_name: &str) -> bool {
        self.factories.contains_key(type_name)
    }

    /// Registered type names, unordered.
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Build one task record, recursively building its children first.
    ///
    /// `children` inside `args` is consumed here; the remaining named
    /// arguments go to the node's typed config. Unrecognized arguments are
    /// not an error.
    pub fn build_task(&self, def: &TaskDef) -> Result<Arc<dyn Node>, ParseError> {
        let mut args = def.args.clone();
        let children = match args.remove("children") {
            Some(value) => {
                let defs: Vec<TaskDef> = serde_json::from_value(value)?;
                defs.iter()
                    .map(|child| self.build_task(child))
                    .collect::<Result<Vec<_>, _>>()?
            }
            None => Vec::new(),
        };

        debug!(task = %def.task, children = children.len(), "building task");
        let factory = self
            .factories
            .get(&def.task)
            .ok_or_else(|| ParseError::UnknownTask(def.task.clone()))?;
        factory(Value::Object(args), children)
    }

    /// Build a runnable job: the definition wrapped in a root `Sequence`.
    pub fn build_job(&self, def: &TaskDef) -> Result<Arc<dyn Node>, ParseError> {
        let root = self.build_task(def)?;
        Ok(Arc::new(Sequence::new([root])))
    }

    /// Parse a JSON definition string and build the job from it.
    pub fn load_job(&self, json: &str) -> Result<Arc<dyn Node>, ParseError> {
        let def: TaskDef = serde_json::from_str(json)?;
        self.build_job(&def)
    }
}

impl Default for Registry {
    /// A registry with every built-in task type.
    fn default() -> Self {
        let mut registry = Self::new();

        registry.register("Sequence", |args, children| {
            let config: NodeConfig = from_args("Sequence", args)?;
            Ok(Arc::new(Sequence::with_config(config, children)))
        });
        registry.register("Selector", |args, children| {
            let config: NodeConfig = from_args("Selector", args)?;
            Ok(Arc::new(Selector::with_config(config, children)))
        });
        registry.register("Parallel", |args, children| {
            let config: NodeConfig = from_args("Parallel", args)?;
            Ok(Arc::new(Parallel::with_config(config, children)))
        });
        registry.register("Repeater", |args, children| {
            let config: RepeaterConfig = from_args("Repeater", args)?;
            Ok(Arc::new(Repeater::with_config(config, children)))
        });
        registry.register("Succeeder", |args, _children| {
            let config: NodeConfig = from_args("Succeeder", args)?;
            Ok(Arc::new(Succeeder::with_config(config)))
        });
        registry.register("Failer", |args, _children| {
            let config: NodeConfig = from_args("Failer", args)?;
            Ok(Arc::new(Failer::with_config(config)))
        });
        registry.register("CmdTask", |args, _children| {
            let config: CmdConfig = from_args("CmdTask", args)?;
            Ok(Arc::new(CmdTask::with_config(config)))
        });

        let client = registry.client.clone();
        registry.register("RequestTask", move |args, _children| {
            let config: RequestConfig = from_args("RequestTask", args)?;
            Ok(Arc::new(RequestTask::with_config(config, client.clone())))
        });

        registry
    }
}
