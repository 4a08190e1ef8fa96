//! Clipper Queue - the persisted set of search terms.
//!
//! Terms live in a named set in a key/value store. Each run reads the whole
//! set and walks it from a random starting point so that no term is always
//! crawled first.
//!
//! # Example
//!
//! ```rust,ignore
//! use clipper_queue::{RedisTermStore, TermQueue};
//!
//! let store = RedisTermStore::connect("redis://127.0.0.1:6379", "fb_channels").await?;
//! let queue = TermQueue::new(Box::new(store));
//! for term in queue.fetch_rotated().await {
//!     println!("{term}");
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod error;
pub mod queue;
pub mod redis_store;
pub mod store;

pub use error::{QueueError, Result};
pub use queue::{rotate, TermQueue};
pub use redis_store::RedisTermStore;
pub use store::{MemoryTermStore, TermStore};
