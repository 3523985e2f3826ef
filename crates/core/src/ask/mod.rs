//! Single-turn golf strategy Q&A backed by the Perplexity chat API.

mod client;
mod error;

pub use client::{Answer, MAX_QUESTION_LEN, PerplexityClient, TokenUsage, validate_question};
pub use error::AskError;
