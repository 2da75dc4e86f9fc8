use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::remote::RecordId;

/// A confirmed pairing with another member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
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
    pub mbti_type: Option<String>,
    #[serde(default)]
    pub love_languages: Vec<String>,
    #[serde(default)]
    pub compatibility_score: Option<u8>,
    #[serde(default)]
    pub matched_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_message: String,
    #[serde(default)]
    pub is_online: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchCreate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mbti_type: Option<String>,
    pub love_languages: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compatibility_score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_on: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_online: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mbti_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub love_languages: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compatibility_score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_on: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_online: Option<bool>,
}
