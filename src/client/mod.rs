//! Generation service client.
//!
//! Sends the staged PDF to the remote service in two phases (topics, then
//! questions) and normalizes every response into model types.

mod client;
pub mod demo;

pub use client::{Generated, GenerationClient, GenerationError, QuestionsRequest, TopicsRequest};
