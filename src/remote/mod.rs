//! The hosted record platform, seen through its generic record API.

mod client;
mod envelope;
mod error;
pub mod store_actor;

pub use client::*;
pub use envelope::*;
pub use error::*;
pub use store_actor::RecordStoreActor;
