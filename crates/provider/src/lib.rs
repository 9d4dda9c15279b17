//! HTTP client for the external provider's Files and Threads/Runs
//! APIs (OpenAI Assistants v2 wire contract).
//!
//! The client wraps exactly the three endpoints the gateway proxies:
//! multipart file upload, thread creation with seeded attachments, and
//! run creation with an optional structured-output constraint. One
//! bounded attempt per call — no retry, no cancellation propagation.

pub mod client;
pub mod schemas;
mod util;

pub use client::{FileObject, ProviderClient, RunObject, RunOptions, ThreadObject};
