// Application layer - use cases over cash cards.
// Every operation takes the acting principal explicitly; ownership is
// enforced here and in the storage queries, never by the caller.

pub mod error;
pub mod service;

pub use error::*;
pub use service::*;
