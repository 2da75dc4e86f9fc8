pub mod match_record;
pub mod profile;
pub mod simulation;
pub mod user;

pub use match_record::*;
pub use profile::*;
pub use simulation::*;
pub use user::*;
