//! # Mock Framework
//!
//! Utilities for testing services against a scripted remote.
//!
//! Use [`create_mock_remote`] to get a client and a receiver. Drive the service
//! call concurrently with helpers like [`expect_create`] or [`expect_fetch`],
//! which hand back the request and the responder so the test can answer with
//! any envelope, or with a transport error.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::remote::{
    Envelope, FetchQuery, Record, RecordId, RemoteRequest, Response, StoreClient, TransportError,
};
use crate::service::{FixedClock, FixedScore, NoticeLog, ServiceContext};

pub const TEST_SCORE: u8 = 88;

pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
}

/// Creates a client whose requests arrive on the returned receiver.
pub fn create_mock_remote(buffer_size: usize) -> (StoreClient, mpsc::Receiver<RemoteRequest>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (StoreClient::new(sender), receiver)
}

/// A context over `client` with a fixed clock and score, recording notices.
pub fn test_context(client: StoreClient) -> (ServiceContext, Arc<NoticeLog>) {
    let notices = Arc::new(NoticeLog::default());
    let ctx = ServiceContext::new(Arc::new(client))
        .with_notifier(notices.clone())
        .with_clock(Arc::new(FixedClock(test_now())))
        .with_scores(Arc::new(FixedScore(TEST_SCORE)));
    (ctx, notices)
}

pub fn record(value: Value) -> Record {
    value.as_object().cloned().expect("record literal must be an object")
}

/// Helper to verify that the next message is a Fetch request
pub async fn expect_fetch(
    receiver: &mut mpsc::Receiver<RemoteRequest>,
) -> Option<(String, FetchQuery, Response)> {
    match receiver.recv().await {
        Some(RemoteRequest::Fetch { table, query, respond_to }) => Some((table, query, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Get request
pub async fn expect_get(
    receiver: &mut mpsc::Receiver<RemoteRequest>,
) -> Option<(String, RecordId, Response)> {
    match receiver.recv().await {
        Some(RemoteRequest::Get { table, id, respond_to, .. }) => Some((table, id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Create request
pub async fn expect_create(
    receiver: &mut mpsc::Receiver<RemoteRequest>,
) -> Option<(String, Vec<Record>, Response)> {
    match receiver.recv().await {
        Some(RemoteRequest::Create { table, records, respond_to }) => {
            Some((table, records, respond_to))
        }
        _ => None,
    }
}

/// Helper to verify that the next message is an Update request
pub async fn expect_update(
    receiver: &mut mpsc::Receiver<RemoteRequest>,
) -> Option<(String, Vec<Record>, Response)> {
    match receiver.recv().await {
        Some(RemoteRequest::Update { table, records, respond_to }) => {
            Some((table, records, respond_to))
        }
        _ => None,
    }
}

/// Helper to verify that the next message is a Delete request
pub async fn expect_delete(
    receiver: &mut mpsc::Receiver<RemoteRequest>,
) -> Option<(String, Vec<RecordId>, Response)> {
    match receiver.recv().await {
        Some(RemoteRequest::Delete { table, ids, respond_to }) => Some((table, ids, respond_to)),
        _ => None,
    }
}

pub fn reply(respond_to: Response, envelope: Envelope) {
    respond_to.send(Ok(envelope)).expect("service stopped waiting");
}

pub fn fail(respond_to: Response, reason: &str) {
    respond_to
        .send(Err(TransportError::Failed(reason.to_string())))
        .expect("service stopped waiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::RemoteClient;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_remote() {
        let (client, mut receiver) = create_mock_remote(10);

        let fetch_task = tokio::spawn(async move {
            client.fetch_records("match", FetchQuery::select(["Name"])).await
        });

        let (table, query, responder) =
            expect_fetch(&mut receiver).await.expect("Expected Fetch request");
        assert_eq!(table, "match");
        assert_eq!(query.fields, vec!["Name"]);
        reply(responder, Envelope::with_records(vec![record(json!({"Id": 1}))]));

        let result = fetch_task.await.unwrap().unwrap();
        assert_eq!(result.records().len(), 1);
    }
}
