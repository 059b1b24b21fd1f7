//! MABKG Common Library
//!
//! Shared error handling and logging for the MABKG workspace.
//!
//! - **Error Handling**: batch-level error type and result alias
//! - **Logging**: `tracing` subscriber setup driven by config or environment
//!
//! # Example
//!
//! ```no_run
//! use mabkg_common::logging::{init_logging, LogConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     init_logging(&LogConfig::from_env()?)?;
//!     Ok(())
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod error;
pub mod logging;

pub use error::{MabkgError, Result};
