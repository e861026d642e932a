//! Hosted vision model glue for document analysis.
//!
//! This crate builds the `generateContent` request for a document photo,
//! pulls the reply text out of the response envelope, and hands it to the
//! core normalizer. The HTTP client itself lives behind the `gemini` feature;
//! [`MockClient`] stands in for it in tests.

pub mod client;
pub mod config;
pub mod prompts;
pub mod request;

pub use client::*;
pub use config::*;
pub use prompts::*;
pub use request::*;
