//! Model client implementations shipped in-tree.
//!
//! Only the mock lives here; real providers are supplied by the host
//! through the `ModelClient` port.

pub mod mock;

pub use mock::{MockModelClient, RecordedCall};
