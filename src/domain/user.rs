use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::remote::RecordId;

/// Account-level profile of the person using the app.
///
/// Exactly one user is expected to be active at a time; the store does not
/// enforce it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: RecordId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub mbti_type: Option<String>,
    #[serde(default)]
    pub love_languages: Vec<String>,
    #[serde(default)]
    pub question_responses: Vec<Value>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_active: bool,
}

/// Payload for registering a user.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCreate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    pub bio: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mbti_type: Option<String>,
    pub love_languages: Vec<String>,
    pub question_responses: Vec<Value>,
    pub interests: Vec<String>,
}

impl UserCreate {
    pub fn new(name: impl Into<String>, age: u32, location: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            age: Some(age),
            location: location.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mbti_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub love_languages: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_responses: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interests: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}
