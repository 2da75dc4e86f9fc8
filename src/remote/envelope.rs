use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A backend record: snake_case field names mapped to JSON values.
pub type Record = Map<String, Value>;

/// Identifier assigned by the remote store.
pub type RecordId = i64;

/// Backend name of the identifier field.
pub const ID_FIELD: &str = "Id";

/// Uniform wrapper returned by the remote store for every call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<RecordResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Envelope {
    pub fn with_data(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            ..Self::default()
        }
    }

    pub fn with_records(records: Vec<Record>) -> Self {
        Self::with_data(Value::Array(records.into_iter().map(Value::Object).collect()))
    }

    pub fn with_results(results: Vec<RecordResult>) -> Self {
        Self {
            success: true,
            results: Some(results),
            ..Self::default()
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Records carried in `data`, whether it holds one object or an array of them.
    /// Non-object entries are skipped.
    pub fn records(&self) -> Vec<Record> {
        match &self.data {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| item.as_object().cloned())
                .collect(),
            Some(Value::Object(record)) => vec![record.clone()],
            _ => Vec::new(),
        }
    }

    /// The single record carried in `data`, if any.
    pub fn record(&self) -> Option<Record> {
        self.records().into_iter().next()
    }

    pub fn results(&self) -> &[RecordResult] {
        self.results.as_deref().unwrap_or_default()
    }

    pub fn message_or_default(&self) -> String {
        self.message
            .clone()
            .unwrap_or_else(|| "Unknown error".to_string())
    }
}

/// Outcome of one record inside a batch create/update/delete.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Record>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RecordResult {
    pub fn succeeded(data: Record) -> Self {
        Self {
            success: true,
            data: Some(data),
            ..Self::default()
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn rejected(errors: Vec<FieldError>) -> Self {
        Self {
            errors,
            ..Self::default()
        }
    }
}

/// Field-level validation failure reported by the remote store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub field_label: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field_label: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field_label: field_label.into(),
            message: message.into(),
        }
    }
}

/// Read request: fields to select plus optional filter predicates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchQuery {
    pub fields: Vec<String>,
    #[serde(default, rename = "where", skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<Filter>,
}

impl FetchQuery {
    pub fn select<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            filters: Vec::new(),
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.filters.iter().all(|filter| filter.matches(record))
    }

    /// Keeps only the selected fields (and the id). An empty selection keeps everything.
    pub fn project(&self, record: &Record) -> Record {
        if self.fields.is_empty() {
            return record.clone();
        }
        record
            .iter()
            .filter(|(key, _)| key.as_str() == ID_FIELD || self.fields.iter().any(|f| f == *key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    EqualTo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Filter {
    pub field_name: String,
    pub operator: Operator,
    pub values: Vec<Value>,
}

impl Filter {
    pub fn equal_to(field_name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field_name: field_name.into(),
            operator: Operator::EqualTo,
            values: vec![value.into()],
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        let actual = record.get(&self.field_name).unwrap_or(&Value::Null);
        match self.operator {
            Operator::EqualTo => self.values.iter().any(|expected| expected == actual),
        }
    }
}
