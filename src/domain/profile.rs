use serde::{Deserialize, Serialize};

use crate::remote::RecordId;

/// A browsable dating profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
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
    /// Placeholder score in [70, 100) unless supplied at creation.
    #[serde(default)]
    pub compatibility_score: Option<u8>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub is_online: bool,
}

/// Payload for creating a new profile.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileCreate {
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
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compatibility_score: Option<u8>,
    pub interests: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_online: Option<bool>,
}

impl ProfileCreate {
    pub fn new(name: impl Into<String>, age: u32, location: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            age: Some(age),
            location: location.into(),
            ..Self::default()
        }
    }
}

/// Sparse update of a profile. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
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
    pub compatibility_score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interests: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_online: Option<bool>,
}
