/// How a field's value is encoded on the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Float,
    Flag,
    Timestamp,
    /// Ordered strings, comma-joined on the backend.
    List,
    /// Like `List`, but blank positions are kept.
    Sequence,
    /// JSON array stored as an encoded string.
    JsonList,
    /// JSON object stored as an encoded string.
    JsonObject,
}

/// Value used on create when neither spelling of a field was supplied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldDefault {
    Text(&'static str),
    Float(f64),
    Flag(bool),
    Null,
    Now,
    /// Placeholder compatibility score drawn at creation time.
    Score,
    /// `<prefix> <unix millis>`
    StampedName(&'static str),
    EmptyList,
    EmptyJson,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    /// View-model (camelCase) name.
    pub view: &'static str,
    /// Backend (snake_case) name.
    pub backend: &'static str,
    pub kind: FieldKind,
    pub default: Option<FieldDefault>,
}

impl FieldSpec {
    pub const fn new(view: &'static str, backend: &'static str, kind: FieldKind) -> Self {
        Self {
            view,
            backend,
            kind,
            default: None,
        }
    }

    pub const fn or(self, default: FieldDefault) -> Self {
        Self {
            default: Some(default),
            ..self
        }
    }
}

use FieldDefault as D;
use FieldKind as K;

const PROFILE_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("name", "Name", K::Text),
    FieldSpec::new("age", "age", K::Integer),
    FieldSpec::new("location", "location", K::Text),
    FieldSpec::new("photo", "photo", K::Text),
    FieldSpec::new("bio", "bio", K::Text),
    FieldSpec::new("mbtiType", "mbti_type", K::Text),
    FieldSpec::new("loveLanguages", "love_languages", K::List),
    FieldSpec::new("compatibilityScore", "compatibility_score", K::Integer).or(D::Score),
    FieldSpec::new("interests", "interests", K::List).or(D::EmptyList),
    FieldSpec::new("isOnline", "is_online", K::Flag).or(D::Flag(true)),
];

const MATCH_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("name", "Name", K::Text),
    FieldSpec::new("age", "age", K::Integer),
    FieldSpec::new("location", "location", K::Text),
    FieldSpec::new("photo", "photo", K::Text),
    FieldSpec::new("mbtiType", "mbti_type", K::Text),
    FieldSpec::new("loveLanguages", "love_languages", K::List),
    FieldSpec::new("compatibilityScore", "compatibility_score", K::Integer).or(D::Score),
    FieldSpec::new("matchedOn", "matched_on", K::Timestamp).or(D::Now),
    FieldSpec::new("lastMessage", "last_message", K::Text).or(D::Text("")),
    FieldSpec::new("isOnline", "is_online", K::Flag).or(D::Flag(true)),
];

const SIMULATION_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("name", "Name", K::Text).or(D::StampedName("Simulation")),
    FieldSpec::new("participants", "participants", K::List),
    FieldSpec::new("questionSequence", "question_sequence", K::Sequence).or(D::Text("1,2,3,4,5")),
    FieldSpec::new("responses", "responses", K::JsonList).or(D::EmptyJson),
    FieldSpec::new("completionRate", "completion_rate", K::Float).or(D::Float(0.0)),
    FieldSpec::new("insights", "insights", K::JsonObject).or(D::EmptyJson),
    FieldSpec::new("startedAt", "started_at", K::Timestamp).or(D::Now),
    FieldSpec::new("completedAt", "completed_at", K::Timestamp).or(D::Null),
    FieldSpec::new("status", "status", K::Text).or(D::Text("active")),
];

const USER_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("name", "Name", K::Text),
    FieldSpec::new("age", "age", K::Integer),
    FieldSpec::new("location", "location", K::Text),
    FieldSpec::new("photo", "photo", K::Text),
    FieldSpec::new("bio", "bio", K::Text),
    FieldSpec::new("mbtiType", "mbti_type", K::Text),
    FieldSpec::new("loveLanguages", "love_languages", K::List),
    FieldSpec::new("questionResponses", "question_responses", K::JsonList).or(D::EmptyJson),
    FieldSpec::new("interests", "interests", K::List).or(D::EmptyList),
    FieldSpec::new("createdAt", "created_at", K::Timestamp).or(D::Now),
    FieldSpec::new("isActive", "is_active", K::Flag).or(D::Flag(true)),
];

/// The four record kinds stored on the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Profile,
    Match,
    Simulation,
    User,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [Self::Profile, Self::Match, Self::Simulation, Self::User];

    pub const fn table(self) -> &'static str {
        match self {
            Self::Profile => "user_profile",
            Self::Match => "match",
            Self::Simulation => "simulation",
            Self::User => "app_User",
        }
    }

    /// Human-facing name used in logs and notifications.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Profile => "Profile",
            Self::Match => "Match",
            Self::Simulation => "Simulation",
            Self::User => "User",
        }
    }

    pub const fn fields(self) -> &'static [FieldSpec] {
        match self {
            Self::Profile => PROFILE_FIELDS,
            Self::Match => MATCH_FIELDS,
            Self::Simulation => SIMULATION_FIELDS,
            Self::User => USER_FIELDS,
        }
    }

    pub fn backend_fields(self) -> Vec<&'static str> {
        self.fields().iter().map(|spec| spec.backend).collect()
    }
}
