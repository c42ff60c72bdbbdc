//! HTTP client for the repertoire backend.
//!
//! Implements [`trainer::ReviewBackend`] over the backend's JSON REST API.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use repertoire_client::RepertoireClient;
//! use trainer::ReviewBackend;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RepertoireClient::new("http://localhost:3000", Duration::from_secs(30))?;
//!     let plan = client.get_plan().await?;
//!     println!("{} reviews due today", plan.review_due_count);
//!     Ok(())
//! }
//! ```

mod client;
mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use client::RepertoireClient;
pub use error::{ClientError, ClientResult};
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockCall, MockRepertoireBackend};
