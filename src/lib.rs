//! Indodax MCP Server
//!
//! Exposes the Indodax exchange REST API, public market data and the signed
//! private `tapi` methods, as Model Context Protocol tools served over stdio.
//!
//! # Example
//! ```no_run
//! use indodax_mcp::{Config, IndodaxClient, McpServer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let client = IndodaxClient::with_config(config.credentials, config.client)?;
//!     McpServer::new(client).run_stdio().await
//! }
//! ```

pub mod config;
pub mod error;
pub mod indodax;
pub mod mcp;

pub use config::Config;
pub use error::{IndodaxError, IndodaxResult};
pub use indodax::{Credentials, IndodaxClient, Payload, PublicEndpoint};
pub use mcp::{McpServer, ToolRegistry};
