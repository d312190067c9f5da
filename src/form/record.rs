use std::collections::BTreeMap;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::Value as Json;

use crate::errors::DecodeError;
use crate::form::schema::{FieldSpec, Schema};
use crate::form::value::{parse_date, parse_number, FieldKind, Value};

/// A node under a record key: a scalar leaf or an ordered sub-collection.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Leaf(Value),
    Items(Vec<Record>),
}

/// Tree-shaped record whose keys come from a [`Schema`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: BTreeMap<String, Node>,
}

impl Record {
    /// Fresh tree with every leaf at its default and every collection holding
    /// its minimum number of default elements.
    pub fn from_schema(schema: &Schema) -> Self {
        let mut fields = BTreeMap::new();
        for field in &schema.fields {
            fields.insert(field.key.to_string(), Node::Leaf(field.default.clone()));
        }
        for collection in &schema.collections {
            let items = (0..collection.min_items)
                .map(|_| Record::from_schema(&collection.item))
                .collect();
            fields.insert(collection.key.to_string(), Node::Items(items));
        }
        Self { fields }
    }

    pub fn node(&self, key: &str) -> Option<&Node> {
        self.fields.get(key)
    }

    pub(crate) fn node_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.fields.get_mut(key)
    }

    pub fn leaf(&self, key: &str) -> Option<&Value> {
        match self.fields.get(key) {
            Some(Node::Leaf(value)) => Some(value),
            _ => None,
        }
    }

    pub fn items(&self, key: &str) -> Option<&[Record]> {
        match self.fields.get(key) {
            Some(Node::Items(items)) => Some(items),
            _ => None,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Wire representation of the record.
    pub fn to_json(&self) -> Result<Json, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Reads a record-shaped JSON object. Missing leaves fall back to their
    /// defaults, missing collections decode as empty and unknown keys are
    /// ignored.
    ///
    /// Meant for read-only snapshot entries: the result may hold fewer
    /// collection elements than `min_items`. Editable trees always come from
    /// [`Record::from_schema`].
    pub fn from_json(schema: &Schema, json: &Json) -> Result<Self, DecodeError> {
        decode_record(schema, json, "")
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, node) in &self.fields {
            match node {
                Node::Leaf(value) => map.serialize_entry(key, value)?,
                Node::Items(items) => map.serialize_entry(key, items)?,
            }
        }
        map.end()
    }
}

fn decode_record(schema: &Schema, json: &Json, at: &str) -> Result<Record, DecodeError> {
    let Json::Object(object) = json else {
        return Err(DecodeError::new(display_at(at), "expected an object"));
    };
    let mut fields = BTreeMap::new();
    for field in &schema.fields {
        let location = join(at, field.key);
        let value = match object.get(field.key) {
            None | Some(Json::Null) => field.default.clone(),
            Some(raw) => decode_leaf(field, raw, &location)?,
        };
        fields.insert(field.key.to_string(), Node::Leaf(value));
    }
    for collection in &schema.collections {
        let location = join(at, collection.key);
        let items = match object.get(collection.key) {
            None | Some(Json::Null) => Vec::new(),
            Some(Json::Array(entries)) => entries
                .iter()
                .enumerate()
                .map(|(index, entry)| {
                    decode_record(&collection.item, entry, &format!("{}[{}]", location, index))
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => return Err(DecodeError::new(location, "expected an array")),
        };
        fields.insert(collection.key.to_string(), Node::Items(items));
    }
    Ok(Record { fields })
}

fn decode_leaf(field: &FieldSpec, raw: &Json, location: &str) -> Result<Value, DecodeError> {
    match raw {
        Json::String(text) => Ok(match field.kind {
            FieldKind::Number => parse_number(text)
                .map(Value::Number)
                .unwrap_or_else(|| Value::text(text.as_str())),
            FieldKind::Date => parse_date(text)
                .map(Value::Date)
                .unwrap_or_else(|| Value::text(text.as_str())),
            FieldKind::Text | FieldKind::Choice => Value::text(text.as_str()),
        }),
        Json::Number(number) => match field.kind {
            FieldKind::Number => number
                .as_f64()
                .map(Value::Number)
                .ok_or_else(|| DecodeError::new(location, "number out of range")),
            _ => Ok(Value::Text(number.to_string())),
        },
        _ => Err(DecodeError::new(location, "expected a string or number")),
    }
}

fn join(at: &str, key: &str) -> String {
    if at.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", at, key)
    }
}

fn display_at(at: &str) -> &str {
    if at.is_empty() {
        "<root>"
    } else {
        at
    }
}
