//! Compatibility-quiz progress: appending responses, finalizing, and finding
//! the session in progress.

mod error;
mod progress;

pub use error::*;
pub use progress::*;
