//! Repository implementations for data access.
//!
//! Repositories implement the core traits on top of `SeaORM`, hiding the
//! database details from the rest of the application.

pub mod attachment;
pub mod board;
mod hydrate;
pub mod message;

pub use attachment::AttachmentRepository;
pub use board::BoardRepository;
pub use message::MessageRepository;
