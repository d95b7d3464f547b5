//! Model Context Protocol surface
//!
//! - [`protocol`]: JSON-RPC and MCP message types
//! - [`registry`]: tool table (name, schema, handler)
//! - [`server`]: stdio message loop

pub mod protocol;
pub mod registry;
pub mod server;

pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, Tool, ToolsCallResult};
pub use registry::{ParamKind, ParamSpec, ToolRegistry, ToolSpec};
pub use server::McpServer;
