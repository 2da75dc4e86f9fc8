pub mod app_system;
pub mod card;
pub mod domain;
pub mod mapping;
pub mod remote;
pub mod service;
pub mod simulation;
pub mod users;

#[cfg(test)]
pub mod mock_framework;
#[cfg(test)]
mod integration_tests;
