//! # Hearth Store - Token Persistence
//!
//! **Purpose**: Persist capability tokens the way a document database would, keyed by
//! token id, with point lookups, `$set`/`$unset`-style partial updates and deletes.
//!
//! - [`DocumentStorage`]: the collection abstraction, with [`MemoryDocumentStorage`] and
//!   [`FileDocumentStorage`] backends
//! - [`codec`]: the persisted record layout, and the place where unknown requirement or
//!   token kinds are detected
//! - [`DocumentTokenStore`]: `TokenStore` over any `DocumentStorage`
//! - [`MemoryNotificationStore`]: `NotificationEffects` kept in memory

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod codec;
pub mod document;
pub mod file;
pub mod memory;
pub mod notifications;
pub mod token_store;

pub use document::{Collection, Document, DocumentStorage};
pub use file::FileDocumentStorage;
pub use memory::MemoryDocumentStorage;
pub use notifications::MemoryNotificationStore;
pub use token_store::DocumentTokenStore;
