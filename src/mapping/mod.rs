//! Field-name and value translation between view models and backend records.

pub mod codec;
mod field;
mod mapper;

pub use codec::Lenient;
pub use field::*;
pub use mapper::*;
