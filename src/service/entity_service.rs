use std::marker::PhantomData;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use super::context::ServiceContext;
use super::entity::Entity;
use super::error::ServiceError;
use super::notify::Notice;
use crate::mapping::{from_backend, to_backend, CreateDefaults, Lenient, MappingMode};
use crate::remote::{Envelope, FetchQuery, Filter, Record, RecordId, RecordResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    List,
    Find,
    Get,
    Create,
    Update,
    Delete,
}

impl Operation {
    fn verb(self) -> &'static str {
        match self {
            Self::List | Self::Find | Self::Get => "fetch",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    fn past(self) -> &'static str {
        match self {
            Self::List | Self::Find | Self::Get => "fetched",
            Self::Create => "created",
            Self::Update => "updated",
            Self::Delete => "deleted",
        }
    }

    /// Notice raised when the remote rejects the whole request.
    fn rejection_notice(self, message: &str) -> Option<Notice> {
        match self {
            Self::List => Some(Notice::warning(message)),
            Self::Find | Self::Get => None,
            Self::Create | Self::Update | Self::Delete => Some(Notice::error(message)),
        }
    }
}

/// CRUD access to one record kind on the remote platform.
///
/// Two surfaces share one implementation. The `try_*` methods return a
/// [`ServiceError`] that tells not-found, rejection, per-record failure and
/// transport failure apart. The plain methods collapse any failure into an
/// empty list, `None` or `false` after logging it. Either way, messages the
/// remote returned are passed to the notifier, and every operation is exactly
/// one remote call.
pub struct EntityService<T: Entity> {
    ctx: ServiceContext,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> Clone for EntityService<T> {
    fn clone(&self) -> Self {
        Self::new(self.ctx.clone())
    }
}

impl<T: Entity> EntityService<T> {
    pub fn new(ctx: ServiceContext) -> Self {
        Self {
            ctx,
            _entity: PhantomData,
        }
    }

    pub fn context(&self) -> &ServiceContext {
        &self.ctx
    }

    pub fn table(&self) -> &'static str {
        T::KIND.table()
    }

    // -------------------------------------------------------------------------
    // Lenient surface
    // -------------------------------------------------------------------------

    /// All records; empty on any failure.
    pub async fn list(&self) -> Vec<T> {
        self.try_list()
            .await
            .unwrap_or_else(|e| self.collapse(Operation::List, e, Vec::new()))
    }

    /// `None` both when the record does not exist and when the call failed.
    pub async fn get_by_id(&self, id: RecordId) -> Option<T> {
        self.try_get_by_id(id)
            .await
            .map(Some)
            .unwrap_or_else(|e| self.collapse(Operation::Get, e, None))
    }

    pub async fn create(&self, payload: T::Create) -> Option<T> {
        self.try_create(payload)
            .await
            .map(Some)
            .unwrap_or_else(|e| self.collapse(Operation::Create, e, None))
    }

    /// Create from a loose view model that may mix camelCase and snake_case keys.
    pub async fn create_view(&self, view: Record) -> Option<T> {
        self.try_create_view(view)
            .await
            .map(Some)
            .unwrap_or_else(|e| self.collapse(Operation::Create, e, None))
    }

    pub async fn update(&self, id: RecordId, patch: T::Patch) -> Option<T> {
        self.try_update(id, patch)
            .await
            .map(Some)
            .unwrap_or_else(|e| self.collapse(Operation::Update, e, None))
    }

    pub async fn update_view(&self, id: RecordId, view: Record) -> Option<T> {
        self.try_update_view(id, view)
            .await
            .map(Some)
            .unwrap_or_else(|e| self.collapse(Operation::Update, e, None))
    }

    /// True only if the remote reports at least one successful deletion.
    pub async fn delete(&self, id: RecordId) -> bool {
        self.try_delete(id)
            .await
            .map(|()| true)
            .unwrap_or_else(|e| self.collapse(Operation::Delete, e, false))
    }

    // -------------------------------------------------------------------------
    // Typed-error surface
    // -------------------------------------------------------------------------

    pub async fn try_list(&self) -> Result<Vec<T>, ServiceError> {
        self.fetch(Operation::List, Vec::new()).await
    }

    /// Records matching every filter. Rejections raise no notice.
    pub async fn try_find(&self, filters: Vec<Filter>) -> Result<Vec<T>, ServiceError> {
        self.fetch(Operation::Find, filters).await
    }

    #[instrument(skip(self), fields(table = T::KIND.table()))]
    pub async fn try_get_by_id(&self, id: RecordId) -> Result<T, ServiceError> {
        debug!("Sending request");
        let envelope = self
            .ctx
            .remote
            .get_record_by_id(T::KIND.table(), id, Self::query())
            .await?;
        self.ensure_success(&envelope, Operation::Get)?;
        let record = envelope.record().ok_or(ServiceError::NotFound {
            entity: T::KIND.label(),
            id,
        })?;
        self.decode(&record)
    }

    pub async fn try_create(&self, payload: T::Create) -> Result<T, ServiceError> {
        let view = Self::to_view(&payload)?;
        self.try_create_view(view).await
    }

    #[instrument(skip(self, view), fields(table = T::KIND.table()))]
    pub async fn try_create_view(&self, view: Record) -> Result<T, ServiceError> {
        let defaults = CreateDefaults {
            now: self.ctx.clock.now(),
            compatibility_score: self.ctx.scores.compatibility_score(),
        };
        let record = to_backend(&view, T::KIND, &MappingMode::Create(defaults));
        debug!(fields = record.len(), "Sending request");
        let envelope = self
            .ctx
            .remote
            .create_records(T::KIND.table(), vec![record])
            .await?;
        let created = self.first_success(&envelope, Operation::Create)?;
        self.accept(created, Operation::Create)
    }

    pub async fn try_update(&self, id: RecordId, patch: T::Patch) -> Result<T, ServiceError> {
        let view = Self::to_view(&patch)?;
        self.try_update_view(id, view).await
    }

    #[instrument(skip(self, view), fields(table = T::KIND.table()))]
    pub async fn try_update_view(&self, id: RecordId, view: Record) -> Result<T, ServiceError> {
        let record = to_backend(&view, T::KIND, &MappingMode::Patch(id));
        debug!(fields = record.len(), "Sending request");
        let envelope = self
            .ctx
            .remote
            .update_records(T::KIND.table(), vec![record])
            .await?;
        let updated = self.first_success(&envelope, Operation::Update)?;
        self.accept(updated, Operation::Update)
    }

    #[instrument(skip(self), fields(table = T::KIND.table()))]
    pub async fn try_delete(&self, id: RecordId) -> Result<(), ServiceError> {
        debug!("Sending request");
        let envelope = self
            .ctx
            .remote
            .delete_records(T::KIND.table(), vec![id])
            .await?;
        self.first_success(&envelope, Operation::Delete)?;
        info!(id, "{} deleted successfully", T::KIND.label());
        self.notify_success(Operation::Delete);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Envelope handling
    // -------------------------------------------------------------------------

    #[instrument(skip(self, filters), fields(table = T::KIND.table(), filters = filters.len()))]
    async fn fetch(&self, op: Operation, filters: Vec<Filter>) -> Result<Vec<T>, ServiceError> {
        let query = filters.into_iter().fold(Self::query(), FetchQuery::filter);
        debug!("Sending request");
        let envelope = self.ctx.remote.fetch_records(T::KIND.table(), query).await?;
        self.ensure_success(&envelope, op)?;

        let items: Vec<T> = envelope
            .records()
            .iter()
            .filter_map(|record| match self.decode(record) {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!(error = %e, "Skipping undecodable record");
                    None
                }
            })
            .collect();
        debug!(count = items.len(), "Fetched records");
        Ok(items)
    }

    fn ensure_success(&self, envelope: &Envelope, op: Operation) -> Result<(), ServiceError> {
        if envelope.success {
            return Ok(());
        }
        let message = envelope.message_or_default();
        error!(%message, "Error trying to {} {}", op.verb(), T::KIND.label());
        if let Some(notice) = op.rejection_notice(&message) {
            self.ctx.notifier.notify(notice);
        }
        Err(ServiceError::Rejected {
            entity: T::KIND.label(),
            message,
        })
    }

    /// Reports every failed record, then returns the data of the first successful one.
    fn first_success(
        &self,
        envelope: &Envelope,
        op: Operation,
    ) -> Result<Option<Record>, ServiceError> {
        self.ensure_success(envelope, op)?;
        let results = envelope.results();

        let failed: Vec<&RecordResult> = results.iter().filter(|r| !r.success).collect();
        if !failed.is_empty() {
            error!(
                failed = failed.len(),
                details = ?failed,
                "Failed to {} {} records",
                op.verb(),
                T::KIND.label()
            );
            for result in &failed {
                for field in &result.errors {
                    self.ctx
                        .notifier
                        .notify(Notice::error(format!("{}: {}", field.field_label, field.message)));
                }
                if let Some(message) = &result.message {
                    self.ctx.notifier.notify(Notice::error(message.clone()));
                }
            }
        }

        match results.iter().find(|r| r.success) {
            Some(result) => Ok(result.data.clone()),
            None => Err(ServiceError::RecordsFailed {
                entity: T::KIND.label(),
                failed: failed.len(),
            }),
        }
    }

    /// Decodes the record a successful write returned. Success is only
    /// announced once the record is in hand.
    fn accept(&self, data: Option<Record>, op: Operation) -> Result<T, ServiceError> {
        let record = data.ok_or(ServiceError::Decode {
            entity: T::KIND.label(),
            reason: format!("{} result carried no record", op.verb()),
        })?;
        let item = self.decode(&record)?;
        info!(id = item.id(), "{} {} successfully", T::KIND.label(), op.past());
        self.notify_success(op);
        Ok(item)
    }

    fn notify_success(&self, op: Operation) {
        self.ctx.notifier.notify(Notice::success(format!(
            "{} {} successfully!",
            T::KIND.label(),
            op.past()
        )));
    }

    fn decode(&self, record: &Record) -> Result<T, ServiceError> {
        let view = match from_backend(record, T::KIND) {
            Lenient::Clean(view) => view,
            Lenient::Recovered { value, reason } => {
                warn!(%reason, "Recovered malformed fields with defaults");
                value
            }
        };
        serde_json::from_value(Value::Object(view)).map_err(|e| ServiceError::Decode {
            entity: T::KIND.label(),
            reason: e.to_string(),
        })
    }

    fn collapse<R>(&self, op: Operation, e: ServiceError, fallback: R) -> R {
        match &e {
            ServiceError::NotFound { .. } => debug!(error = %e, "{} not found", T::KIND.label()),
            ServiceError::Transport(_) => {
                error!(error = %e, "Error trying to {} {}", op.verb(), T::KIND.label())
            }
            _ => warn!(error = %e, "Could not {} {}", op.verb(), T::KIND.label()),
        }
        fallback
    }

    fn query() -> FetchQuery {
        FetchQuery::select(T::KIND.backend_fields())
    }

    fn to_view(payload: &impl Serialize) -> Result<Record, ServiceError> {
        match serde_json::to_value(payload) {
            Ok(Value::Object(view)) => Ok(view),
            Ok(other) => Err(ServiceError::Encode {
                entity: T::KIND.label(),
                reason: format!("expected an object, got {other}"),
            }),
            Err(e) => Err(ServiceError::Encode {
                entity: T::KIND.label(),
                reason: e.to_string(),
            }),
        }
    }
}
