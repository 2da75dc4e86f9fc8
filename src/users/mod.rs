use tracing::{instrument, warn};

use crate::domain::{User, UserPatch};
use crate::remote::{Filter, RecordId};
use crate::service::UserService;

/// Lookups of the account currently using the app.
#[derive(Clone)]
pub struct UserDirectory {
    service: UserService,
}

impl UserDirectory {
    pub fn new(service: UserService) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &UserService {
        &self.service
    }

    /// The first user flagged active; `None` if there is none or the lookup failed.
    #[instrument(skip(self))]
    pub async fn current_user(&self) -> Option<User> {
        match self.service.try_find(vec![Filter::equal_to("is_active", true)]).await {
            Ok(users) => users.into_iter().next(),
            Err(e) => {
                warn!(error = %e, "Error fetching current user");
                None
            }
        }
    }

    pub async fn deactivate(&self, id: RecordId) -> Option<User> {
        let patch = UserPatch {
            is_active: Some(false),
            ..UserPatch::default()
        };
        self.service.update(id, patch).await
    }
}
