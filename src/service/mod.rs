//! Generic record services, one instantiation per entity kind.

mod context;
mod entity;
mod entity_service;
mod error;
mod notify;

pub use context::*;
pub use entity::*;
pub use entity_service::*;
pub use error::*;
pub use notify::*;

use crate::domain::{Match, Profile, Simulation, User};

pub type ProfileService = EntityService<Profile>;
pub type MatchService = EntityService<Match>;
pub type SimulationService = EntityService<Simulation>;
pub type UserService = EntityService<User>;
