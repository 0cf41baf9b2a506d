//! Leaf tasks that do real work: subprocess calls and HTTP requests.
//!
//! Everything here only needs to satisfy the [`arbor_tree::Node`] contract;
//! the tree core knows nothing about these types.

pub mod cmd;
pub mod http;

pub use cmd::{CmdConfig, CmdTask};
pub use http::{RequestConfig, RequestTask};
