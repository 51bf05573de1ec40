//! # ntopng Historical API
//!
//! A Rust client library for querying historical [ntopng](https://www.ntop.org/)
//! data — alerts, flows, and timeseries — through the
//! [REST v2 API](https://www.ntop.org/guides/ntopng/api/rest/api_v2.html).
//!
//! ## Features
//!
//! - Alert counters and alert database queries for every alert family
//! - Timeseries retrieval for interfaces and hosts
//! - Historical flow and Top-K flow queries (ntopng Pro)
//! - Pluggable transport via the [`RestClient`] trait
//!
//! Queries are translated one-to-one into endpoint invocations; responses
//! come back as raw `serde_json::Value` exactly as the server sent them.
//! SQL-style clauses (select/where/group by/order by) are forwarded to the
//! server verbatim, so their correctness is the caller's responsibility.
//!
//! ## Example
//!
//! ```rust,no_run
//! use ntopng_historical_api::{Historical, NtopngClient};
//! use url::Url;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = NtopngClient::new(
//!         Url::parse("http://localhost:3000")?,
//!         Duration::from_secs(10),
//!     )?;
//!
//!     let historical = Historical::new(&client);
//!
//!     let epoch_end = chrono::Utc::now().timestamp();
//!     let alerts = historical
//!         .get_host_alerts(0, epoch_end - 3600, epoch_end, "*", None, 5, None, None)
//!         .await?;
//!     println!("{alerts}");
//!     Ok(())
//! }
//! ```

mod client;
mod errors;
mod historical;
mod types;

pub use client::{NtopngClient, Params, RestClient};
pub use errors::{NtopngError, Result};
pub use historical::Historical;
pub use types::AlertFamily;
