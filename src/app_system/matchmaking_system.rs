use std::sync::Arc;

use tracing::{error, info};

use super::config::Config;
use crate::mapping::EntityKind;
use crate::remote::RecordStoreActor;
use crate::service::{
    MatchService, Notifier, ProfileService, ServiceContext, SimulationService, UserService,
};
use crate::simulation::SimulationProgress;
use crate::users::UserDirectory;

/// Services for every entity kind, wired to one record store.
///
/// Owns the record-store task; dropping the services closes its mailbox.
pub struct MatchmakingSystem {
    pub profiles: ProfileService,
    pub matches: MatchService,
    pub simulations: SimulationProgress,
    pub users: UserDirectory,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl MatchmakingSystem {
    /// Starts an in-process record store and builds the services over it.
    pub fn new(config: &Config, notifier: Arc<dyn Notifier>) -> Self {
        info!(project_id = ?config.project_id, "Starting matchmaking system");

        let (store, client) = RecordStoreActor::new(config.store_buffer);
        let store = store
            .require(EntityKind::Profile.table(), &["Name"])
            .require(EntityKind::Match.table(), &["Name"])
            .require(EntityKind::User.table(), &["Name"]);
        let store_handle = tokio::spawn(store.run());

        let ctx = ServiceContext::new(Arc::new(client)).with_notifier(notifier);
        let mut system = Self::with_context(ctx);
        system.handles.push(store_handle);
        system
    }

    /// Builds the services over any remote client. No background task is owned.
    pub fn with_context(ctx: ServiceContext) -> Self {
        Self {
            profiles: ProfileService::new(ctx.clone()),
            matches: MatchService::new(ctx.clone()),
            simulations: SimulationProgress::new(SimulationService::new(ctx.clone())),
            users: UserDirectory::new(UserService::new(ctx)),
            handles: Vec::new(),
        }
    }

    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");
        let Self {
            profiles,
            matches,
            simulations,
            users,
            handles,
        } = self;

        // Drop every client so the store's mailbox closes.
        drop(profiles);
        drop(matches);
        drop(simulations);
        drop(users);

        for handle in handles {
            if let Err(e) = handle.await {
                error!("Store task failed: {:?}", e);
                return Err(format!("Store task failed: {:?}", e));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
