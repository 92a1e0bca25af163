use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};

/// Three-state switch for field attributes.
///
/// `Unset` is what a config file produces by omitting the attribute (or
/// writing `null`); it reads as `false` but, unlike an explicit `False`,
/// never replaces an existing value when used as an override.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<bool>", into = "Option<bool>")]
pub enum Flag {
    #[default]
    Unset,
    True,
    False,
}

impl Flag {
    pub fn is_unset(&self) -> bool {
        matches!(self, Flag::Unset)
    }

    pub fn is_set(&self) -> bool {
        !self.is_unset()
    }

    /// Effective value; unset reads as false
    pub fn as_bool(&self) -> bool {
        matches!(self, Flag::True)
    }

    /// Replace with `other` when it carries a value
    pub fn override_with(&mut self, other: Flag) {
        if other.is_set() {
            *self = other;
        }
    }
}

impl From<bool> for Flag {
    fn from(value: bool) -> Self {
        if value { Flag::True } else { Flag::False }
    }
}

impl From<Option<bool>> for Flag {
    fn from(value: Option<bool>) -> Self {
        value.map(Flag::from).unwrap_or(Flag::Unset)
    }
}

impl From<Flag> for Option<bool> {
    fn from(flag: Flag) -> Self {
        match flag {
            Flag::Unset => None,
            Flag::True => Some(true),
            Flag::False => Some(false),
        }
    }
}

/// Declared type of a custom field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    String,
    Int,
    Uint,
    Float,
    Date,
    Bool,
    DateTime,
    Combobox,
    Image,
    List,
    File,
    Other(String),
}

impl FieldType {
    pub fn parse(tag: &str) -> Self {
        match tag {
            "string" => FieldType::String,
            "int" => FieldType::Int,
            "uint" => FieldType::Uint,
            "float" => FieldType::Float,
            "date" => FieldType::Date,
            "bool" => FieldType::Bool,
            "datetime" => FieldType::DateTime,
            "cmb" | "combobox" => FieldType::Combobox,
            "image" => FieldType::Image,
            "list" => FieldType::List,
            "file" => FieldType::File,
            other => FieldType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FieldType::String => "string",
            FieldType::Int => "int",
            FieldType::Uint => "uint",
            FieldType::Float => "float",
            FieldType::Date => "date",
            FieldType::Bool => "bool",
            FieldType::DateTime => "datetime",
            FieldType::Combobox => "cmb",
            FieldType::Image => "image",
            FieldType::List => "list",
            FieldType::File => "file",
            FieldType::Other(tag) => tag,
        }
    }
}

/// Attribute key of a field's declared size
const SIZE_ATTRIBUTE: &str = "size";

/// Schema entry for a single field of a record type.
///
/// Flags are typed; anything else a tenant puts on a field is kept in
/// `attributes` and written back out untouched. Text attributes accept any
/// scalar so one odd value never fails the whole tenant config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomField {
    #[serde(rename = "type", default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(default, skip_serializing_if = "Flag::is_unset")]
    pub(crate) mandatory: Flag,
    #[serde(default, skip_serializing_if = "Flag::is_unset")]
    pub(crate) readonly: Flag,
    #[serde(default, skip_serializing_if = "Flag::is_unset")]
    pub(crate) masked: Flag,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub(crate) command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl CustomField {
    pub fn of_type(field_type: FieldType) -> Self {
        Self {
            kind: Some(field_type.as_str().to_string()),
            ..Default::default()
        }
    }

    /// Declared type; fields without a tag are strings
    pub fn field_type(&self) -> FieldType {
        self.kind.as_deref().map(FieldType::parse).unwrap_or(FieldType::String)
    }

    pub fn mandatory(&self) -> bool {
        self.mandatory.as_bool()
    }

    pub fn readonly(&self) -> bool {
        self.readonly.as_bool()
    }

    pub fn masked(&self) -> bool {
        self.masked.as_bool()
    }

    pub fn command(&self) -> Option<&str> {
        self.command.as_deref()
    }

    /// Declared size; integers, whole floats and numeric text are accepted
    pub fn size(&self) -> Option<i64> {
        match self.attributes.get(SIZE_ATTRIBUTE)? {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn set_mandatory(&mut self, mandatory: bool) -> &mut Self {
        self.mandatory = Flag::from(mandatory);
        self
    }

    pub fn set_readonly(&mut self, readonly: bool) -> &mut Self {
        self.readonly = Flag::from(readonly);
        self
    }

    pub fn set_command(&mut self, command: Option<String>) -> &mut Self {
        self.command = command.filter(|c| !c.is_empty());
        self
    }

    pub fn set_size(&mut self, size: i64) -> &mut Self {
        self.attributes.insert(SIZE_ATTRIBUTE.to_string(), Value::from(size));
        self
    }

    pub fn set_value(&mut self, value: Value) -> &mut Self {
        self.value = Some(value);
        self
    }

    /// Shape a stored value for this field's type.
    ///
    /// Date fields keep only the `YYYY-MM-DD` prefix of longer strings.
    pub fn value_by_type(&self, value: &Value) -> Value {
        match (self.field_type(), value) {
            (FieldType::Date, Value::String(date)) if date.len() > 10 => {
                match date.get(..10) {
                    Some(day) => Value::String(day.to_string()),
                    None => value.clone(),
                }
            }
            _ => value.clone(),
        }
    }
}

/// Strings as-is, numbers and booleans as their text, anything else unset
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => Some(text),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// All fields of one record type, keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomFields(BTreeMap<String, CustomField>);

impl CustomFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value on a field, creating the field entry when missing
    pub fn set_value(&mut self, field_name: &str, value: Value) {
        self.0.entry(field_name.to_string()).or_default().set_value(value);
    }
}

impl Deref for CustomFields {
    type Target = BTreeMap<String, CustomField>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for CustomFields {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl FromIterator<(String, CustomField)> for CustomFields {
    fn from_iter<I: IntoIterator<Item = (String, CustomField)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
