use std::sync::Arc;

use serde_json::json;
use tracing::{error, info, warn, Instrument};

use matchmaking_data::app_system::{setup_tracing, Config, MatchmakingSystem};
use matchmaking_data::card::{CardHandlers, ProfileCard};
use matchmaking_data::domain::{ProfileCreate, SimulationCreate, UserCreate};
use matchmaking_data::service::TracingNotifier;

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = Config::load().map_err(|e| e.to_string())?;
    info!(?config, "Starting matchmaking demo");

    let system = MatchmakingSystem::new(&config, Arc::new(TracingNotifier));

    let user = system
        .users
        .service()
        .create(UserCreate::new("Alice", 31, "Porto"))
        .await
        .ok_or("Could not register the demo user")?;
    info!(user_id = user.id, "User registered");

    let span = tracing::info_span!("profile_creation");
    let profile = async {
        let payload = ProfileCreate {
            bio: "Coffee, climbing and long walks".into(),
            mbti_type: Some("INFJ".into()),
            love_languages: vec!["Words".into(), "Touch".into()],
            photo: Some("https://images.example.com/ana.jpg".into()),
            ..ProfileCreate::new("Ana", 29, "Lisbon")
        };
        system.profiles.create(payload).await
    }
    .instrument(span)
    .await
    .ok_or("Could not create the demo profile")?;

    let profiles = system.profiles.list().await;
    info!(count = profiles.len(), "Profiles available");

    let card = ProfileCard::new(&profile, CardHandlers::default());
    info!(
        name = card.display_name(),
        subtitle = %card.subtitle(),
        mbti = card.mbti_label(),
        badge = %card.match_badge(),
        love_languages = ?card.love_language_badges(),
        "Rendered profile card"
    );

    let span = tracing::info_span!("simulation");
    let outcome = async {
        let simulation = system
            .simulations
            .service()
            .try_create(SimulationCreate::between([user.name.as_str(), profile.name.as_str()]))
            .await?;

        for answer in ["yes", "sometimes"] {
            let updated = system
                .simulations
                .add_response(simulation.id, json!({ "answer": answer }))
                .await?;
            info!(rate = updated.completion_rate, "Response recorded");
        }

        let active = system.simulations.get_active().await?;
        let responses = active.responses.clone();
        system.simulations.complete(active.id, responses).await
    }
    .instrument(span)
    .await;

    match outcome {
        Ok(simulation) => info!(
            simulation_id = simulation.id,
            status = ?simulation.status,
            "Simulation completed"
        ),
        Err(e) => error!(error = %e, "Simulation failed"),
    }

    match system.users.current_user().await {
        Some(current) => info!(user_id = current.id, name = %current.name, "Current user"),
        None => warn!("No active user"),
    }

    if !system.profiles.delete(profile.id).await {
        warn!(profile_id = profile.id, "Profile was not deleted");
    }

    system.shutdown().await?;

    info!("Demo completed successfully");
    Ok(())
}
