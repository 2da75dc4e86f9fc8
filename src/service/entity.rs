use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::{
    Match, MatchCreate, MatchPatch, Profile, ProfileCreate, ProfilePatch, Simulation,
    SimulationCreate, SimulationPatch, User, UserCreate, UserPatch,
};
use crate::mapping::EntityKind;
use crate::remote::RecordId;

/// A record kind served by [`EntityService`](super::EntityService).
///
/// The view model is decoded from the mapper's camelCase output; create and
/// patch payloads are serialized to camelCase before mapping, so a patch that
/// skips `None` fields becomes a sparse backend update.
pub trait Entity: DeserializeOwned + Clone + Send + Sync + 'static {
    const KIND: EntityKind;
    type Create: Serialize + Send + Sync + Debug;
    type Patch: Serialize + Send + Sync + Debug;

    fn id(&self) -> RecordId;
}

impl Entity for Profile {
    const KIND: EntityKind = EntityKind::Profile;
    type Create = ProfileCreate;
    type Patch = ProfilePatch;

    fn id(&self) -> RecordId {
        self.id
    }
}

impl Entity for Match {
    const KIND: EntityKind = EntityKind::Match;
    type Create = MatchCreate;
    type Patch = MatchPatch;

    fn id(&self) -> RecordId {
        self.id
    }
}

impl Entity for Simulation {
    const KIND: EntityKind = EntityKind::Simulation;
    type Create = SimulationCreate;
    type Patch = SimulationPatch;

    fn id(&self) -> RecordId {
        self.id
    }
}

impl Entity for User {
    const KIND: EntityKind = EntityKind::User;
    type Create = UserCreate;
    type Patch = UserPatch;

    fn id(&self) -> RecordId {
        self.id
    }
}
