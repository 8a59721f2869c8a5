//! Streaming copy engine.
//!
//! This module moves bytes between any two [`Storage`](crate::backend::Storage)
//! backends in bounded-memory chunks, one file at a time.

mod dir;
mod file;

// Re-export public API
pub use dir::{CopyStats, copy_folder};
pub use file::copy_file;
