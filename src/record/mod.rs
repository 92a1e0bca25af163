pub mod sanitize;
pub mod tree;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::datamodel::DataModelError;

pub use sanitize::{clean_nil, clean_nil_value, normalize_primitives};
pub use tree::{find_json_array, find_json_field, Mapper, TreeMapper};

/// Field holding a record's identifier
pub const UUID_FIELD: &str = "uuid";

/// Who last touched a record, and when
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub partner: String,
    #[serde(default)]
    pub role: String,
}

impl Metadata {
    pub fn stamp(user: impl Into<String>, partner: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            timestamp: Some(Utc::now()),
            user: user.into(),
            partner: partner.into(),
            role: role.into(),
        }
    }
}

/// Partner-level access entry attached to an overview row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessConfig {
    pub partner: String,
    #[serde(rename = "algo", default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
}

/// Anything stored as a document with an identifier and a field tree
pub trait DomainEntity {
    fn uuid(&self) -> &str;
    fn set_uuid(&mut self, uuid: String);
    fn entity(&self) -> &Map<String, Value>;
    fn entity_mut(&mut self) -> &mut Map<String, Value>;

    /// Flattened projection shown in overview lists
    fn overview_row(&self) -> Map<String, Value> {
        self.entity().clone()
    }

    fn access_config(&self) -> Vec<AccessConfig> {
        Vec::new()
    }
}

/// A tenant document: metadata plus a schemaless field tree.
///
/// The field tree is whatever the tenant's datamodel describes; typed
/// accessors return `None` when a field is missing or holds another kind
/// of value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(rename = "entity", default)]
    pub fields: Map<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self {
            metadata: Metadata::default(),
            fields,
        }
    }

    /// Build a record from a JSON object of fields
    pub fn from_json(value: Value) -> Result<Self, DataModelError> {
        match value {
            Value::Object(fields) => Ok(Self::from_fields(fields)),
            other => Err(DataModelError::InvalidRecord(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Identifier, empty when unset
    pub fn uuid(&self) -> &str {
        self.fields.get(UUID_FIELD).and_then(Value::as_str).unwrap_or("")
    }

    pub fn set_uuid(&mut self, uuid: String) {
        self.fields.insert(UUID_FIELD.to_string(), Value::String(uuid));
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), value);
    }

    pub fn value_string(&self, name: &str) -> Option<&str> {
        self.fields.get(name)?.as_str()
    }

    /// Integers, also accepted when stored as text or as a whole float
    pub fn value_int(&self, name: &str) -> Option<i64> {
        match self.fields.get(name)? {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn value_float(&self, name: &str) -> Option<f64> {
        match self.fields.get(name)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// RFC 3339 timestamps or plain `YYYY-MM-DD` dates (midnight UTC)
    pub fn value_date(&self, name: &str) -> Option<DateTime<Utc>> {
        let text = self.value_string(name)?;
        if let Ok(time) = DateTime::parse_from_rfc3339(text) {
            return Some(time.with_timezone(&Utc));
        }
        let date = NaiveDate::parse_from_str(text.get(..10)?, "%Y-%m-%d").ok()?;
        Some(date.and_hms_opt(0, 0, 0)?.and_utc())
    }

    pub fn value_bool(&self, name: &str) -> Option<bool> {
        match self.fields.get(name)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Approximate stored size: the byte length of the serialized fields
    pub fn size(&self) -> usize {
        serde_json::to_vec(&self.fields).map(|bytes| bytes.len()).unwrap_or(0)
    }
}

impl DomainEntity for Record {
    fn uuid(&self) -> &str {
        Record::uuid(self)
    }

    fn set_uuid(&mut self, uuid: String) {
        Record::set_uuid(self, uuid)
    }

    fn entity(&self) -> &Map<String, Value> {
        &self.fields
    }

    fn entity_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.fields
    }
}

/// Record with null and emptied branches removed from its field tree
pub fn sanitize_record(mut record: Record) -> Record {
    record.fields = clean_nil(std::mem::take(&mut record.fields));
    record
}

/// Apply a mapper to a record with the default walker settings.
///
/// Richtext is always truncated here; use [`TreeMapper::apply_to_record`]
/// with a configured walker to honour `MAPPER_RICHTEXT_TRUNCATION`.
pub fn apply_mapper_to_record(record: &mut Record, mapper: &Mapper) {
    TreeMapper::default().apply_to_record(record, mapper);
}

impl TreeMapper {
    pub fn apply_to_record(&self, record: &mut Record, mapper: &Mapper) {
        self.apply_mapper(&mut record.fields, mapper);
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
