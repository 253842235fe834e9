//! Retrieval of STEP (ISO 10303-21) file content over HTTP(S).
//!
//! The crate does not parse STEP data. It hands back the raw text of a remote
//! file so a downstream parser can take over. Local files are out of scope:
//! read them yourself and pass the content on directly.
//!
//! ```rust,no_run
//! # async fn run() -> Result<(), step_fetch::FetchError> {
//! let text = step_fetch::fetch_remote_text("https://example.com/part.step").await?;
//! assert!(text.starts_with("ISO-10303-21;"));
//! # Ok(()) }
//! ```
pub mod config;
pub mod errors;
pub mod net;

pub use config::{FetchConfig, FetchConfigError};
pub use errors::{FetchError, NetError};
pub use net::{fetch_remote_text, StepFetcher};
