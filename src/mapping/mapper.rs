//! Translation between view models and backend records.
//!
//! View models use camelCase names (`loveLanguages`); the backend uses
//! snake_case (`love_languages`). Both spellings are accepted on input and the
//! camelCase one wins. Nothing here touches the network, the clock or a random
//! source: values that depend on them arrive in [`CreateDefaults`].

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

use super::codec::{
    coerce_flag, coerce_float, coerce_integer, decode_lenient, encode_json, join_list, split_list,
    split_sequence, Lenient,
};
use super::field::{EntityKind, FieldDefault, FieldKind, FieldSpec};
use crate::remote::{Record, RecordId, ID_FIELD};

/// View-model name of the identifier.
pub const VIEW_ID_FIELD: &str = "id";

/// Inputs for creation defaults that are not pure functions of the view model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CreateDefaults {
    pub now: DateTime<Utc>,
    pub compatibility_score: u8,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MappingMode {
    /// Full record; absent fields take their creation default.
    Create(CreateDefaults),
    /// Sparse patch of an existing record: only supplied fields are forwarded.
    Patch(RecordId),
}

pub fn to_backend(view: &Record, kind: EntityKind, mode: &MappingMode) -> Record {
    let mut record = Record::new();
    if let MappingMode::Patch(id) = mode {
        record.insert(ID_FIELD.to_string(), Value::from(*id));
    }

    for spec in kind.fields() {
        match pick(view, spec) {
            Some(value) => {
                record.insert(spec.backend.to_string(), encode(spec.kind, value));
            }
            None => {
                if let (MappingMode::Create(defaults), Some(default)) = (mode, spec.default) {
                    let value = default_value(spec.kind, default, defaults);
                    record.insert(spec.backend.to_string(), value);
                }
            }
        }
    }
    record
}

/// Rebuilds the view model of a backend record. Fields whose JSON could not be
/// decoded take their empty default and the outcome is `Recovered`.
pub fn from_backend(record: &Record, kind: EntityKind) -> Lenient<Record> {
    let mut view = Record::new();
    let mut recoveries = Vec::new();

    if let Some(id) = record.get(ID_FIELD).and_then(coerce_integer) {
        view.insert(VIEW_ID_FIELD.to_string(), Value::from(id));
    }

    for spec in kind.fields() {
        let Some(raw) = record.get(spec.backend).filter(|value| !value.is_null()) else {
            continue;
        };
        let decoded = match spec.kind {
            FieldKind::Text => Some(match raw {
                Value::String(_) => raw.clone(),
                other => Value::String(other.to_string()),
            }),
            FieldKind::Integer => coerce_integer(raw).map(Value::from),
            FieldKind::Float => coerce_float(raw).map(Value::from),
            FieldKind::Flag => coerce_flag(raw).map(Value::Bool),
            FieldKind::Timestamp => match raw.as_str().map(DateTime::parse_from_rfc3339) {
                Some(Ok(_)) => Some(raw.clone()),
                _ => {
                    recoveries.push(format!("{}: not an RFC 3339 timestamp", spec.backend));
                    None
                }
            },
            FieldKind::List => Some(Value::from(read_list(raw, split_list))),
            FieldKind::Sequence => Some(Value::from(read_list(raw, split_sequence))),
            FieldKind::JsonList => {
                let lenient = decode_lenient::<Vec<Value>>(raw).map(Value::Array);
                Some(note_recovery(spec, lenient, &mut recoveries))
            }
            FieldKind::JsonObject => {
                let lenient = decode_lenient::<Record>(raw).map(Value::Object);
                Some(note_recovery(spec, lenient, &mut recoveries))
            }
        };
        if let Some(value) = decoded {
            view.insert(spec.view.to_string(), value);
        }
    }

    if recoveries.is_empty() {
        Lenient::Clean(view)
    } else {
        Lenient::Recovered {
            value: view,
            reason: recoveries.join("; "),
        }
    }
}

/// The camelCase spelling if present and non-null, else the snake_case one.
fn pick<'a>(view: &'a Record, spec: &FieldSpec) -> Option<&'a Value> {
    [spec.view, spec.backend]
        .into_iter()
        .filter_map(|key| view.get(key))
        .find(|value| !value.is_null())
}

fn encode(kind: FieldKind, value: &Value) -> Value {
    match kind {
        FieldKind::Text => value.clone(),
        FieldKind::Timestamp => match value.as_str().map(DateTime::parse_from_rfc3339) {
            Some(Ok(at)) => timestamp(at.with_timezone(&Utc)),
            _ => value.clone(),
        },
        FieldKind::Integer => coerce_integer(value).map(Value::from).unwrap_or(Value::Null),
        FieldKind::Float => coerce_float(value).map(Value::from).unwrap_or(Value::Null),
        FieldKind::Flag => coerce_flag(value).map(Value::Bool).unwrap_or(Value::Null),
        FieldKind::List | FieldKind::Sequence => join_list(value),
        FieldKind::JsonList | FieldKind::JsonObject => encode_json(value),
    }
}

fn default_value(kind: FieldKind, default: FieldDefault, defaults: &CreateDefaults) -> Value {
    match default {
        FieldDefault::Text(text) => Value::from(text),
        FieldDefault::Float(f) => Value::from(f),
        FieldDefault::Flag(b) => Value::Bool(b),
        FieldDefault::Null => Value::Null,
        FieldDefault::Now => timestamp(defaults.now),
        FieldDefault::Score => Value::from(defaults.compatibility_score),
        FieldDefault::StampedName(prefix) => {
            Value::String(format!("{prefix} {}", defaults.now.timestamp_millis()))
        }
        FieldDefault::EmptyList => Value::String(String::new()),
        FieldDefault::EmptyJson => match kind {
            FieldKind::JsonObject => Value::from("{}"),
            _ => Value::from("[]"),
        },
    }
}

/// Backend encoding of a timestamp.
pub fn timestamp(at: DateTime<Utc>) -> Value {
    Value::String(at.to_rfc3339_opts(SecondsFormat::Millis, true))
}

fn read_list(raw: &Value, split: fn(&str) -> Vec<String>) -> Vec<String> {
    match raw {
        Value::String(s) => split(s),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        other => vec![other.to_string()],
    }
}

fn note_recovery(spec: &FieldSpec, lenient: Lenient<Value>, recoveries: &mut Vec<String>) -> Value {
    if let Lenient::Recovered { reason, .. } = &lenient {
        recoveries.push(format!("{}: {}", spec.backend, reason));
    }
    lenient.into_value()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    fn defaults() -> CreateDefaults {
        CreateDefaults {
            now: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
            compatibility_score: 81,
        }
    }

    #[test]
    fn test_profile_create_joins_love_languages() {
        let view = record(json!({
            "name": "Ana",
            "age": "29",
            "loveLanguages": ["Words", "Touch"],
        }));

        let backend = to_backend(&view, EntityKind::Profile, &MappingMode::Create(defaults()));

        assert_eq!(backend["Name"], json!("Ana"));
        assert_eq!(backend["age"], json!(29));
        assert_eq!(backend["love_languages"], json!("Words,Touch"));
        assert_eq!(backend["compatibility_score"], json!(81));
        assert_eq!(backend["interests"], json!(""));
        assert_eq!(backend["is_online"], json!(true));
        assert!(!backend.contains_key("bio"));
        assert!(!backend.contains_key(ID_FIELD));

        let view = from_backend(&backend, EntityKind::Profile).into_value();
        assert_eq!(view["loveLanguages"], json!(["Words", "Touch"]));
        assert_eq!(view["interests"], json!([]));
    }

    #[test]
    fn test_camel_case_wins_over_snake_case() {
        let view = record(json!({
            "mbtiType": "INFJ",
            "mbti_type": "ESTP",
            "compatibility_score": 90,
            "isOnline": null,
            "is_online": false,
        }));

        let backend = to_backend(&view, EntityKind::Match, &MappingMode::Create(defaults()));

        assert_eq!(backend["mbti_type"], json!("INFJ"));
        assert_eq!(backend["compatibility_score"], json!(90));
        assert_eq!(backend["is_online"], json!(false));
        assert_eq!(backend["matched_on"], json!("2024-05-01T10:00:00.000Z"));
        assert_eq!(backend["last_message"], json!(""));
    }

    #[test]
    fn test_simulation_create_defaults() {
        let backend = to_backend(
            &Record::new(),
            EntityKind::Simulation,
            &MappingMode::Create(defaults()),
        );

        assert_eq!(backend["Name"], json!("Simulation 1714557600000"));
        assert_eq!(backend["question_sequence"], json!("1,2,3,4,5"));
        assert_eq!(backend["responses"], json!("[]"));
        assert_eq!(backend["insights"], json!("{}"));
        assert_eq!(backend["completion_rate"], json!(0.0));
        assert_eq!(backend["completed_at"], Value::Null);
        assert_eq!(backend["status"], json!("active"));
    }

    #[test]
    fn test_patch_forwards_only_supplied_fields() {
        let view = record(json!({
            "lastMessage": "See you Friday",
            "loveLanguages": ["Time"],
        }));

        let backend = to_backend(&view, EntityKind::Match, &MappingMode::Patch(12));

        assert_eq!(
            backend,
            record(json!({
                "Id": 12,
                "last_message": "See you Friday",
                "love_languages": "Time",
            }))
        );
    }

    #[test]
    fn test_timestamps_share_one_backend_format() {
        let view = record(json!({
            "completedAt": "2024-05-01T12:00:00+02:00",
            "startedAt": "not a date",
        }));

        let backend = to_backend(&view, EntityKind::Simulation, &MappingMode::Patch(3));

        assert_eq!(backend["completed_at"], json!("2024-05-01T10:00:00.000Z"));
        assert_eq!(backend["started_at"], json!("not a date"));
    }

    #[test]
    fn test_round_trip_through_backend() {
        let view = record(json!({
            "name": "Sim",
            "participants": ["4", "9"],
            "questionSequence": ["1", "2", "3"],
            "responses": [{"q": 1, "a": "yes"}],
            "completionRate": 33.5,
            "insights": {"tone": "warm"},
            "startedAt": "2024-05-01T10:00:00.000Z",
            "status": "active",
        }));

        let backend = to_backend(&view, EntityKind::Simulation, &MappingMode::Patch(3));
        assert_eq!(backend["responses"], json!(r#"[{"a":"yes","q":1}]"#));

        let mut expected = view.clone();
        expected.insert(VIEW_ID_FIELD.to_string(), json!(3));
        assert_eq!(from_backend(&backend, EntityKind::Simulation), Lenient::Clean(expected));
    }

    #[test]
    fn test_malformed_json_field_is_recovered() {
        let backend = record(json!({
            "Id": 5,
            "question_responses": "{broken",
            "created_at": "yesterday",
            "is_active": "true",
        }));

        let lenient = from_backend(&backend, EntityKind::User);

        assert!(lenient.is_recovered());
        let view = lenient.into_value();
        assert_eq!(view["questionResponses"], json!([]));
        assert_eq!(view["isActive"], json!(true));
        assert!(!view.contains_key("createdAt"));
    }
}
