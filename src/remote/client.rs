use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument};

use super::envelope::{Envelope, FetchQuery, Record, RecordId};
use super::error::TransportError;

/// Outcome of one remote call.
pub type RemoteResult = Result<Envelope, TransportError>;

/// Generic record API of the hosted data platform.
///
/// Every call answers with an [`Envelope`]; a `TransportError` means the call never
/// produced one. Retry and backoff, if any, belong to the implementation.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    async fn fetch_records(&self, table: &str, query: FetchQuery) -> RemoteResult;

    async fn get_record_by_id(&self, table: &str, id: RecordId, query: FetchQuery) -> RemoteResult;

    async fn create_records(&self, table: &str, records: Vec<Record>) -> RemoteResult;

    async fn update_records(&self, table: &str, records: Vec<Record>) -> RemoteResult;

    async fn delete_records(&self, table: &str, ids: Vec<RecordId>) -> RemoteResult;
}

pub type Response = oneshot::Sender<RemoteResult>;

/// Messages understood by a channel-backed record store.
#[derive(Debug)]
pub enum RemoteRequest {
    Fetch {
        table: String,
        query: FetchQuery,
        respond_to: Response,
    },
    Get {
        table: String,
        id: RecordId,
        query: FetchQuery,
        respond_to: Response,
    },
    Create {
        table: String,
        records: Vec<Record>,
        respond_to: Response,
    },
    Update {
        table: String,
        records: Vec<Record>,
        respond_to: Response,
    },
    Delete {
        table: String,
        ids: Vec<RecordId>,
        respond_to: Response,
    },
}

/// Handle to a record store reached over a channel.
#[derive(Clone)]
pub struct StoreClient {
    sender: mpsc::Sender<RemoteRequest>,
}

impl StoreClient {
    pub fn new(sender: mpsc::Sender<RemoteRequest>) -> Self {
        Self { sender }
    }

    async fn call(&self, request: impl FnOnce(Response) -> RemoteRequest) -> RemoteResult {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(request(respond_to))
            .await
            .map_err(|_| TransportError::Closed)?;
        response.await.map_err(|_| TransportError::Dropped)?
    }
}

#[async_trait]
impl RemoteClient for StoreClient {
    #[instrument(skip(self, query))]
    async fn fetch_records(&self, table: &str, query: FetchQuery) -> RemoteResult {
        debug!("Sending request");
        let table = table.to_string();
        self.call(|respond_to| RemoteRequest::Fetch { table, query, respond_to })
            .await
    }

    #[instrument(skip(self, query))]
    async fn get_record_by_id(&self, table: &str, id: RecordId, query: FetchQuery) -> RemoteResult {
        debug!("Sending request");
        let table = table.to_string();
        self.call(|respond_to| RemoteRequest::Get { table, id, query, respond_to })
            .await
    }

    #[instrument(skip(self, records), fields(count = records.len()))]
    async fn create_records(&self, table: &str, records: Vec<Record>) -> RemoteResult {
        debug!("Sending request");
        let table = table.to_string();
        self.call(|respond_to| RemoteRequest::Create { table, records, respond_to })
            .await
    }

    #[instrument(skip(self, records), fields(count = records.len()))]
    async fn update_records(&self, table: &str, records: Vec<Record>) -> RemoteResult {
        debug!("Sending request");
        let table = table.to_string();
        self.call(|respond_to| RemoteRequest::Update { table, records, respond_to })
            .await
    }

    #[instrument(skip(self))]
    async fn delete_records(&self, table: &str, ids: Vec<RecordId>) -> RemoteResult {
        debug!("Sending request");
        let table = table.to_string();
        self.call(|respond_to| RemoteRequest::Delete { table, ids, respond_to })
            .await
    }
}
