use std::collections::{BTreeMap, HashMap};

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use super::client::{RemoteRequest, StoreClient};
use super::envelope::{Envelope, FetchQuery, FieldError, Record, RecordId, RecordResult, ID_FIELD};

type Table = BTreeMap<RecordId, Record>;

/// In-process record store speaking the remote envelope protocol.
///
/// Owns every table and answers requests one at a time, so writes to the same
/// record are serialized by the mailbox. Ids are assigned from a single counter
/// shared by all tables.
pub struct RecordStoreActor {
    receiver: mpsc::Receiver<RemoteRequest>,
    tables: HashMap<String, Table>,
    required: HashMap<String, Vec<String>>,
    next_id: RecordId,
}

impl RecordStoreActor {
    pub fn new(buffer_size: usize) -> (Self, StoreClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            tables: HashMap::new(),
            required: HashMap::new(),
            next_id: 1,
        };
        (actor, StoreClient::new(sender))
    }

    /// Declares fields that must be non-empty on create for `table`.
    pub fn require(mut self, table: &str, fields: &[&str]) -> Self {
        self.required
            .insert(table.to_string(), fields.iter().map(|f| f.to_string()).collect());
        self
    }

    pub async fn run(mut self) {
        info!("Record store starting");
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                RemoteRequest::Fetch { table, query, respond_to } => {
                    let _ = respond_to.send(Ok(self.handle_fetch(&table, &query)));
                }
                RemoteRequest::Get { table, id, query, respond_to } => {
                    let _ = respond_to.send(Ok(self.handle_get(&table, id, &query)));
                }
                RemoteRequest::Create { table, records, respond_to } => {
                    let _ = respond_to.send(Ok(self.handle_create(&table, records)));
                }
                RemoteRequest::Update { table, records, respond_to } => {
                    let _ = respond_to.send(Ok(self.handle_update(&table, records)));
                }
                RemoteRequest::Delete { table, ids, respond_to } => {
                    let _ = respond_to.send(Ok(self.handle_delete(&table, ids)));
                }
            }
        }
        info!("Record store stopped");
    }

    #[instrument(skip(self, query))]
    fn handle_fetch(&self, table: &str, query: &FetchQuery) -> Envelope {
        let records: Vec<Record> = self
            .tables
            .get(table)
            .map(|rows| {
                rows.values()
                    .filter(|row| query.matches(row))
                    .map(|row| query.project(row))
                    .collect()
            })
            .unwrap_or_default();
        debug!(count = records.len(), "Fetched records");
        Envelope::with_records(records)
    }

    #[instrument(skip(self, query))]
    fn handle_get(&self, table: &str, id: RecordId, query: &FetchQuery) -> Envelope {
        match self.tables.get(table).and_then(|rows| rows.get(&id)) {
            Some(row) => Envelope::with_data(Value::Object(query.project(row))),
            None => {
                debug!("Record not found");
                Envelope {
                    success: true,
                    ..Envelope::default()
                }
            }
        }
    }

    #[instrument(skip(self, records), fields(count = records.len()))]
    fn handle_create(&mut self, table: &str, records: Vec<Record>) -> Envelope {
        let results = records
            .into_iter()
            .map(|mut record| {
                let errors = self.missing_fields(table, &record);
                if !errors.is_empty() {
                    warn!(failed = errors.len(), "Rejected record");
                    return RecordResult::rejected(errors);
                }
                let id = self.next_id;
                self.next_id += 1;
                record.insert(ID_FIELD.to_string(), Value::from(id));
                self.tables
                    .entry(table.to_string())
                    .or_default()
                    .insert(id, record.clone());
                debug!(id, "Record created");
                RecordResult::succeeded(record)
            })
            .collect();
        Envelope::with_results(results)
    }

    #[instrument(skip(self, records), fields(count = records.len()))]
    fn handle_update(&mut self, table: &str, records: Vec<Record>) -> Envelope {
        let rows = self.tables.entry(table.to_string()).or_default();
        let results = records
            .into_iter()
            .map(|patch| {
                let Some(id) = patch.get(ID_FIELD).and_then(Value::as_i64) else {
                    return RecordResult::failed("Record is missing an Id");
                };
                match rows.get_mut(&id) {
                    Some(row) => {
                        for (key, value) in patch {
                            row.insert(key, value);
                        }
                        debug!(id, "Record updated");
                        RecordResult::succeeded(row.clone())
                    }
                    None => RecordResult::failed(format!("Record with Id {id} does not exist")),
                }
            })
            .collect();
        Envelope::with_results(results)
    }

    #[instrument(skip(self))]
    fn handle_delete(&mut self, table: &str, ids: Vec<RecordId>) -> Envelope {
        let rows = self.tables.entry(table.to_string()).or_default();
        let results = ids
            .into_iter()
            .map(|id| match rows.remove(&id) {
                Some(_) => {
                    debug!(id, "Record deleted");
                    RecordResult {
                        success: true,
                        ..RecordResult::default()
                    }
                }
                None => RecordResult::failed(format!("Record with Id {id} does not exist")),
            })
            .collect();
        Envelope::with_results(results)
    }

    fn missing_fields(&self, table: &str, record: &Record) -> Vec<FieldError> {
        self.required
            .get(table)
            .map(|fields| {
                fields
                    .iter()
                    .filter(|field| is_blank(record.get(field.as_str())))
                    .map(|field| FieldError::new(field.clone(), "is required"))
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}
