//! Field model: the closed field-type taxonomy and the value shape each type
//! carries.
//!
//! Scalar types always hold a string; `list` and `table` hold an ordered
//! sequence of records. Values that do not match their type are coerced to the
//! type's zero value (`""` or `[]`), never rejected.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    #[default]
    Text,
    Textarea,
    RichText,
    Image,
    Url,
    Time,
    List,
    Table,
}

impl FieldType {
    pub fn is_list(self) -> bool {
        matches!(self, FieldType::List | FieldType::Table)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Textarea => "textarea",
            FieldType::RichText => "richText",
            FieldType::Image => "image",
            FieldType::Url => "url",
            FieldType::Time => "time",
            FieldType::List => "list",
            FieldType::Table => "table",
        }
    }

    /// `""` for scalar types, `[]` for list types.
    pub fn zero_value(self) -> FieldValue {
        if self.is_list() {
            FieldValue::List(Vec::new())
        } else {
            FieldValue::Text(String::new())
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn is_list_type(field_type: FieldType) -> bool {
    field_type.is_list()
}

/// One column of a list/table item.
///
/// A sub-field typed `list` is a bullet field: persisted as an array of
/// strings, edited as a single newline-separated string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubFieldDescriptor {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
}

impl SubFieldDescriptor {
    pub fn new(id: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            field_type,
        }
    }

    pub fn text(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            field_type: FieldType::Text,
        }
    }

    pub fn is_bullets(&self) -> bool {
        self.field_type == FieldType::List
    }
}

/// The value held by a field. Serialized untagged: a JSON string or array.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    List(Vec<Value>),
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Text(String::new())
    }
}

impl FieldValue {
    /// Coerce an arbitrary JSON value into the shape required by `field_type`.
    pub fn coerce(field_type: FieldType, raw: &Value) -> FieldValue {
        match (field_type.is_list(), raw) {
            (true, Value::Array(items)) => FieldValue::List(items.clone()),
            (false, Value::String(s)) => FieldValue::Text(s.clone()),
            _ => field_type.zero_value(),
        }
    }

    /// Same as [`FieldValue::coerce`] for an already-typed value.
    pub fn conform(self, field_type: FieldType) -> FieldValue {
        match (field_type.is_list(), self) {
            (true, v @ FieldValue::List(_)) | (false, v @ FieldValue::Text(_)) => v,
            _ => field_type.zero_value(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::List(_) => None,
        }
    }

    pub fn as_items(&self) -> Option<&[Value]> {
        match self {
            FieldValue::List(items) => Some(items),
            FieldValue::Text(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::List(items) => items.is_empty(),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::List(items) => Value::Array(items.clone()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<Vec<Value>> for FieldValue {
    fn from(items: Vec<Value>) -> Self {
        FieldValue::List(items)
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Text(s) => serializer.serialize_str(s),
            FieldValue::List(items) => items.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Lenient on purpose: shape is fixed up against the field type later.
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => FieldValue::Text(s),
            Value::Array(items) => FieldValue::List(items),
            _ => FieldValue::default(),
        })
    }
}

/// One editable value plus its type and, for lists, its item schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "FieldDescriptorRepr")]
pub struct FieldDescriptor {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub value: FieldValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_schema: Option<Vec<SubFieldDescriptor>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FieldDescriptorRepr {
    id: String,
    #[serde(default)]
    label: String,
    #[serde(rename = "type", default)]
    field_type: FieldType,
    #[serde(default)]
    value: FieldValue,
    #[serde(default)]
    placeholder: Option<String>,
    #[serde(default)]
    item_schema: Option<Vec<SubFieldDescriptor>>,
}

impl From<FieldDescriptorRepr> for FieldDescriptor {
    fn from(r: FieldDescriptorRepr) -> Self {
        FieldDescriptor {
            id: r.id,
            label: r.label,
            field_type: r.field_type,
            value: r.value.conform(r.field_type),
            placeholder: r.placeholder,
            item_schema: r.item_schema,
        }
    }
}

impl FieldDescriptor {
    /// New field holding the zero value of `field_type`.
    pub fn new(id: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            field_type,
            value: field_type.zero_value(),
            placeholder: None,
            item_schema: None,
        }
    }

    pub fn text(id: impl Into<String>, label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(id, label, FieldType::Text).with_value(FieldValue::Text(value.into()))
    }

    pub fn list(
        id: impl Into<String>,
        label: impl Into<String>,
        item_schema: Vec<SubFieldDescriptor>,
    ) -> Self {
        Self::new(id, label, FieldType::List).with_item_schema(item_schema)
    }

    /// Replace the value, coercing it to this field's shape.
    pub fn with_value(mut self, value: FieldValue) -> Self {
        self.value = value.conform(self.field_type);
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_item_schema(mut self, item_schema: Vec<SubFieldDescriptor>) -> Self {
        self.item_schema = Some(item_schema);
        self
    }

    pub fn is_list(&self) -> bool {
        self.field_type.is_list()
    }

    pub fn set_value(&mut self, value: FieldValue) {
        self.value = value.conform(self.field_type);
    }

    /// Scalar text, or `""` for list fields.
    pub fn text_value(&self) -> &str {
        self.value.as_text().unwrap_or("")
    }

    pub fn items(&self) -> &[Value] {
        self.value.as_items().unwrap_or(&[])
    }

    pub fn item_schema(&self) -> Option<&[SubFieldDescriptor]> {
        self.item_schema.as_deref()
    }

    /// Display columns of a table field (the item schema labels, falling
    /// back to ids when a label is blank).
    pub fn columns(&self) -> Vec<&str> {
        self.item_schema
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .map(|s| if s.label.is_empty() { s.id.as_str() } else { s.label.as_str() })
            .collect()
    }
}
