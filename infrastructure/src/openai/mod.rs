//! OpenAI-compatible chat completions adapter
//!
//! One stateless POST per completion. The same client serves the hosted
//! API, managed-cloud deployments and self-hosted compatible servers; the
//! differences live in [`EndpointProfile`].

pub mod client;
pub mod endpoint;
mod types;

pub use client::{OpenAiClient, OpenAiSettings};
pub use endpoint::{DEFAULT_API_VERSION, DEFAULT_BASE_URL, EndpointProfile};
