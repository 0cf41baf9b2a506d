//! Subprocess leaf task.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tokio::process::Command;
use tracing::debug;

use arbor_tree::{Blackboard, Node, NodeError, NodeMeta, Status};

/// Construction parameters for [`CmdTask`].
#[derive(Debug, Clone, Deserialize)]
pub struct CmdConfig {
    /// Shell command line, run via `sh -c`.
    pub cmd: String,
    pub name: Option<String>,
    /// Leaf-local bound on the subprocess; the tree core imposes none.
    pub timeout_secs: Option<u64>,
}

/// Runs a shell command to completion, capturing its output into the
/// node's own-data. Non-zero and signal-terminated exits fail the task.
pub struct CmdTask {
    meta: NodeMeta,
    cmd: String,
    timeout_secs: Option<u64>,
}

impl CmdTask {
    pub fn new(cmd: impl Into<String>) -> Self {
        Self::with_config(CmdConfig {
            cmd: cmd.into(),
            name: None,
            timeout_secs: None,
        })
    }

    pub fn with_config(config: CmdConfig) -> Self {
        Self {
            meta: NodeMeta::new("CmdTask", config.name),
            cmd: config.cmd,
            timeout_secs: config.timeout_secs,
        }
    }
}

#[async_trait]
impl Node for CmdTask {
    fn meta(&self) -> &NodeMeta {
        &self.meta
    }

    async fn update(&self, data: Blackboard) -> Result<Status, NodeError> {
        data.set("cmd", json!(self.cmd));
        debug!(cmd = %self.cmd, "running command");

        let mut command = Command::new("sh");
        command
            .arg("-c")
            .arg(&self.cmd)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let output = match self.timeout_secs {
            Some(secs) => {
                // If the timeout drops the future, take the child with it.
                command.kill_on_drop(true);
                tokio::time::timeout(Duration::from_secs(secs), command.output())
                    .await
                    .map_err(|_| format!("command timed out after {secs}s"))??
            }
            None => command.output().await?,
        };

        data.set("stdout", json!(String::from_utf8_lossy(&output.stdout)));
        data.set("stderr", json!(String::from_utf8_lossy(&output.stderr)));
        data.set("exit_code", json!(output.status.code()));

        if output.status.success() {
            Ok(Status::Succeeded)
        } else {
            Ok(Status::Failed)
        }
    }
}
