//! Network layer.
//!
//! [`HttpClient`] is the capability the fetcher depends on. [`ReqwestClient`] is
//! the production implementation; tests and embedders can inject their own.
mod client;
mod fetch;
mod response;

pub use client::{HttpClient, ReqwestClient};
pub use fetch::{fetch_remote_text, StepFetcher};
pub use response::{BodyFuture, Response};
