//! Core logic for Clubhouse.
//!
//! This crate holds the domain types, services and I/O clients with ZERO web
//! framework or database dependencies. Persistence is reached through the
//! repository traits in [`content`], implemented by the db crate.
//!
//! # Modules
//!
//! - `storage` - Attachment blobs on local disk or a remote object store
//! - `content` - Posts, comments, direct messages and their attachments
//! - `realtime` - Connection registry and event fan-out
//! - `ask` - Golf strategy Q&A through an LLM provider

pub mod ask;
pub mod content;
pub mod realtime;
pub mod storage;
