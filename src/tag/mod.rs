//! Tag management for tagvault.
//!
//! Tags are free-form labels attached to a file's logical path. The index is
//! held in memory only and starts empty on every process start.

mod derive;
mod index;

pub use derive::auto_tags;
pub use index::{TagIndex, TagSet};
