use std::sync::Arc;

use serde_json::json;

use crate::app_system::MatchmakingSystem;
use crate::domain::{
    completion_rate, ProfileCreate, ProfilePatch, SimulationCreate, SimulationStatus, UserCreate,
};
use crate::mapping::EntityKind;
use crate::mock_framework::*;
use crate::remote::{Envelope, Filter, RecordResult, RecordStoreActor};
use crate::service::{Notice, NoticeLog, ServiceError, SimulationService};
use crate::simulation::{SimulationError, SimulationProgress};

/// A system backed by a live record store, with a fixed clock and score.
fn start_system() -> (MatchmakingSystem, Arc<NoticeLog>) {
    let (store, client) = RecordStoreActor::new(16);
    let store = store
        .require(EntityKind::Profile.table(), &["Name"])
        .require(EntityKind::Match.table(), &["Name"])
        .require(EntityKind::User.table(), &["Name"]);
    tokio::spawn(store.run());

    let (ctx, notices) = test_context(client);
    (MatchmakingSystem::with_context(ctx), notices)
}

#[tokio::test]
async fn test_profile_lifecycle() {
    let (system, notices) = start_system();

    let payload = ProfileCreate {
        love_languages: vec!["Words".into(), "Touch".into()],
        ..ProfileCreate::new("Ana", 29, "Lisbon")
    };
    let created = system.profiles.create(payload).await.expect("profile should be created");
    assert_eq!(created.love_languages, vec!["Words", "Touch"]);
    assert_eq!(created.compatibility_score, Some(TEST_SCORE));
    assert!(created.is_online);

    let fetched = system.profiles.get_by_id(created.id).await.expect("profile should exist");
    assert_eq!(fetched, created);

    let patch = ProfilePatch {
        bio: Some("Rock climber".into()),
        ..ProfilePatch::default()
    };
    let updated = system.profiles.update(created.id, patch).await.expect("profile should update");
    assert_eq!(updated.bio, "Rock climber");
    assert_eq!(updated.love_languages, vec!["Words", "Touch"]);

    assert_eq!(system.profiles.list().await.len(), 1);

    assert!(system.profiles.delete(created.id).await);
    assert!(system.profiles.get_by_id(created.id).await.is_none());
    assert!(!system.profiles.delete(created.id).await);

    let notices = notices.notices();
    assert!(notices.contains(&Notice::success("Profile created successfully!")));
    assert!(notices.contains(&Notice::success("Profile updated successfully!")));
    assert!(notices.contains(&Notice::error(format!(
        "Record with Id {} does not exist",
        created.id
    ))));
}

#[tokio::test]
async fn test_missing_name_is_reported_per_field() {
    let (system, notices) = start_system();

    let created = system.profiles.create(ProfileCreate::default()).await;
    assert!(created.is_none());
    assert_eq!(notices.notices(), vec![Notice::error("Name: is required")]);
    assert!(system.profiles.list().await.is_empty());
}

#[tokio::test]
async fn test_lookup_of_missing_record() {
    let (system, _) = start_system();

    assert!(system.profiles.get_by_id(404).await.is_none());
    let err = system.profiles.try_get_by_id(404).await.unwrap_err();
    assert_eq!(err, ServiceError::NotFound { entity: "Profile", id: 404 });
}

#[tokio::test]
async fn test_simulation_progress_flow() {
    let (system, _) = start_system();

    // 1. Create with defaults
    let simulation = system
        .simulations
        .service()
        .try_create(SimulationCreate::between(["Alice", "Ana"]))
        .await
        .expect("simulation should be created");
    assert_eq!(simulation.name, "Simulation 1714557600000");
    assert_eq!(simulation.question_sequence, vec!["1", "2", "3", "4", "5"]);
    assert_eq!(simulation.status, SimulationStatus::Active);
    assert_eq!(simulation.completion_rate, 0.0);
    assert_eq!(simulation.started_at, Some(test_now()));

    // 2. Answer two of five questions
    let first = system
        .simulations
        .add_response(simulation.id, json!({"q": 1, "a": "yes"}))
        .await
        .expect("first response");
    assert_eq!(first.completion_rate, 20.0);

    let second = system
        .simulations
        .add_response(simulation.id, json!({"q": 2, "a": "no"}))
        .await
        .expect("second response");
    assert_eq!(second.completion_rate, 40.0);
    assert_eq!(second.responses.len(), 2);
    assert_eq!(second.responses[1], json!({"q": 2, "a": "no"}));

    // 3. The active simulation is the one in progress
    let active = system.simulations.get_active().await.expect("active simulation");
    assert_eq!(active.id, simulation.id);

    // 4. Complete it early
    let completed = system
        .simulations
        .complete(simulation.id, active.responses.clone())
        .await
        .expect("completion");
    assert_eq!(completed.status, SimulationStatus::Completed);
    assert_eq!(completed.completion_rate, 100.0);
    assert_eq!(completed.completed_at, Some(test_now()));
    assert_eq!(completed.responses.len(), 2);

    // 5. Nothing is active and no more answers are accepted
    assert!(matches!(
        system.simulations.get_active().await,
        Err(SimulationError::NoActiveSimulation)
    ));
    assert!(matches!(
        system.simulations.add_response(simulation.id, json!("late")).await,
        Err(SimulationError::AlreadyCompleted(id)) if id == simulation.id
    ));
}

#[tokio::test]
async fn test_completion_rate_follows_question_sequence() {
    let (system, _) = start_system();

    let simulation = system
        .simulations
        .service()
        .try_create(SimulationCreate::between(["Alice", "Ana"]).with_questions(["a", "b", "c"]))
        .await
        .expect("simulation should be created");

    for answered in 1..=4 {
        let updated = system
            .simulations
            .add_response(simulation.id, json!(answered))
            .await
            .expect("response");
        assert_eq!(updated.completion_rate, completion_rate(answered, 3));
    }

    let stored = system.simulations.service().get_by_id(simulation.id).await.expect("stored");
    assert_eq!(stored.completion_rate, 400.0 / 3.0);
    assert_eq!(stored.responses.len(), 4);
}

#[tokio::test]
async fn test_blank_question_positions_still_count() {
    let (system, _) = start_system();

    let simulation = system
        .simulations
        .service()
        .try_create(SimulationCreate::between(["Alice", "Ana"]).with_questions(["1", "", "3"]))
        .await
        .expect("simulation should be created");
    assert_eq!(simulation.question_sequence, vec!["1", "", "3"]);

    let updated = system
        .simulations
        .add_response(simulation.id, json!("yes"))
        .await
        .expect("response");
    assert_eq!(updated.completion_rate, 100.0 / 3.0);
}

#[tokio::test]
async fn test_complete_accepts_more_responses_than_questions() {
    let (system, _) = start_system();

    let simulation = system
        .simulations
        .service()
        .try_create(SimulationCreate::between(["Alice", "Ana"]).with_questions(["a", "b"]))
        .await
        .expect("simulation should be created");

    let responses: Vec<_> = (1..=7).map(|n| json!(n)).collect();
    let completed = system
        .simulations
        .complete(simulation.id, responses.clone())
        .await
        .expect("completion");

    assert_eq!(completed.completion_rate, 100.0);
    assert_eq!(completed.status, SimulationStatus::Completed);
    assert_eq!(completed.responses, responses);
}

#[tokio::test]
async fn test_add_response_to_missing_simulation() {
    let (system, _) = start_system();

    assert!(matches!(
        system.simulations.add_response(42, json!("yes")).await,
        Err(SimulationError::NotFound(42))
    ));
    assert!(matches!(
        system.simulations.get_active().await,
        Err(SimulationError::NoActiveSimulation)
    ));
}

#[tokio::test]
async fn test_current_user_follows_active_flag() {
    let (system, _) = start_system();

    assert!(system.users.current_user().await.is_none());

    let user = system
        .users
        .service()
        .create(UserCreate::new("Alice", 31, "Porto"))
        .await
        .expect("user should be created");
    assert!(user.is_active);
    assert_eq!(user.created_at, Some(test_now()));

    let current = system.users.current_user().await.expect("current user");
    assert_eq!(current.id, user.id);

    let deactivated = system.users.deactivate(user.id).await.expect("deactivated");
    assert!(!deactivated.is_active);
    assert!(system.users.current_user().await.is_none());
}

#[tokio::test]
async fn test_get_active_reports_rejection() {
    // 1. Setup mock
    let (client, mut rx) = create_mock_remote(10);
    let (ctx, notices) = test_context(client);
    let progress = SimulationProgress::new(SimulationService::new(ctx));

    // 2. Run the lookup in background
    let task = tokio::spawn(async move { progress.get_active().await });

    // 3. The query filters on status and the remote refuses it
    let (table, query, responder) = expect_fetch(&mut rx).await.expect("Expected Fetch request");
    assert_eq!(table, "simulation");
    assert_eq!(query.filters, vec![Filter::equal_to("status", "active")]);
    reply(responder, Envelope::failure("Table locked"));

    // 4. The rejection surfaces as an error, without a notice
    let result = task.await.unwrap();
    assert!(matches!(
        result,
        Err(SimulationError::Service(ServiceError::Rejected { .. }))
    ));
    assert!(notices.notices().is_empty());
}

#[tokio::test]
async fn test_add_response_reports_persist_failure() {
    // 1. Setup mock
    let (client, mut rx) = create_mock_remote(10);
    let (ctx, _) = test_context(client);
    let progress = SimulationProgress::new(SimulationService::new(ctx));

    // 2. Run the update in background
    let task = tokio::spawn(async move { progress.add_response(7, json!("yes")).await });

    // 3. The current record is read first
    let (table, id, responder) = expect_get(&mut rx).await.expect("Expected Get request");
    assert_eq!((table.as_str(), id), ("simulation", 7));
    let stored = record(json!({
        "Id": 7,
        "Name": "Simulation 1",
        "question_sequence": "1,2,3,4",
        "responses": "[\"no\"]",
        "completion_rate": 25,
        "status": "active",
    }));
    reply(responder, Envelope::with_data(stored.into()));

    // 4. Then the patch, which the transport loses
    let (_, records, responder) = expect_update(&mut rx).await.expect("Expected Update request");
    assert_eq!(
        records,
        vec![record(json!({
            "Id": 7,
            "responses": "[\"no\",\"yes\"]",
            "completion_rate": 50.0,
        }))]
    );
    fail(responder, "connection reset");

    // 5. Verify result
    let result = task.await.unwrap();
    assert!(matches!(
        result,
        Err(SimulationError::UpdateFailed { id: 7, source }) if source.is_transport()
    ));
}

#[tokio::test]
async fn test_complete_keeps_remote_record_messages() {
    let (client, mut rx) = create_mock_remote(10);
    let (ctx, notices) = test_context(client);
    let progress = SimulationProgress::new(SimulationService::new(ctx));

    let task = tokio::spawn(async move { progress.complete(3, vec![json!("a")]).await });

    let (_, records, responder) = expect_update(&mut rx).await.expect("Expected Update request");
    assert_eq!(records[0]["status"], json!("completed"));
    assert_eq!(records[0]["completion_rate"], json!(100.0));
    assert_eq!(records[0]["completed_at"], json!("2024-05-01T10:00:00.000Z"));
    reply(
        responder,
        Envelope::with_results(vec![RecordResult::failed("Record with Id 3 does not exist")]),
    );

    let result = task.await.unwrap();
    assert!(matches!(result, Err(SimulationError::UpdateFailed { id: 3, .. })));
    assert_eq!(
        notices.notices(),
        vec![Notice::error("Record with Id 3 does not exist")]
    );
}
