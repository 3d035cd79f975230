use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the identity field inside every record.
pub const ID_FIELD: &str = "id";

/// Key of the envelope object wrapping a collection.
pub const ENVELOPE_KEY: &str = "plantlist";

/// Opaque identity value of a record.
///
/// Any JSON scalar is accepted. Two ids are equal when their JSON values are
/// equal, so `"5"` and `5` are different identities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Value);

impl RecordId {
    pub fn new(value: impl Into<Value>) -> Self {
        Self(value.into())
    }

    /// Canonical text encoding used as the identity column of table storage.
    pub fn to_key(&self) -> String {
        self.0.to_string()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Value::String(s) => f.write_str(s),
            other => write!(f, "{other}"),
        }
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(Value::from(value))
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(Value::from(value))
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        Self(Value::from(value))
    }
}

/// A single palette or garden entry.
///
/// Records are open field mappings. Only the `id` field carries meaning to
/// storage; every other field is passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the record identity. A missing or `null` id means the record
    /// has no identity and never matches an update or delete.
    pub fn id(&self) -> Option<RecordId> {
        match self.0.get(ID_FIELD) {
            None | Some(Value::Null) => None,
            Some(value) => Some(RecordId(value.clone())),
        }
    }

    /// Returns true if this record's identity equals `id`.
    pub fn has_id(&self, id: &RecordId) -> bool {
        matches!(self.0.get(ID_FIELD), Some(value) if !value.is_null() && *value == id.0)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Returns the union of both field sets. Fields of `incoming` win on
    /// collision; field order of `self` is kept, new fields go last.
    pub fn merged_with(&self, incoming: &Record) -> Record {
        let mut merged = self.0.clone();
        for (field, value) in &incoming.0 {
            merged.insert(field.clone(), value.clone());
        }
        Record(merged)
    }
}

impl TryFrom<Value> for Record {
    type Error = Value;

    /// Accepts JSON objects only; any other value is handed back.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(other),
        }
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Object(record.0)
    }
}

/// Envelope returned to callers: `{ "plantlist": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlantList {
    pub plantlist: Vec<Record>,
}

/// Result of leniently decoding a stored envelope document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedPlantList {
    pub list: PlantList,
    /// Elements of `plantlist` that were not JSON objects.
    pub skipped: usize,
    /// The document itself was unusable and was replaced by an empty list.
    pub malformed: bool,
}

impl PlantList {
    pub fn new(plantlist: Vec<Record>) -> Self {
        Self { plantlist }
    }

    pub fn into_records(self) -> Vec<Record> {
        self.plantlist
    }

    /// Decodes raw document bytes without ever failing.
    ///
    /// Unparseable JSON, a non-object root, or a missing or non-array
    /// `plantlist` produce an empty list flagged as malformed. Elements that
    /// are not objects are dropped and counted.
    pub fn decode_lenient(bytes: &[u8]) -> DecodedPlantList {
        let Ok(Value::Object(mut root)) = serde_json::from_slice::<Value>(bytes) else {
            return DecodedPlantList {
                malformed: true,
                ..Default::default()
            };
        };

        let Some(Value::Array(items)) = root.remove(ENVELOPE_KEY) else {
            return DecodedPlantList {
                malformed: true,
                ..Default::default()
            };
        };

        let total = items.len();
        let plantlist: Vec<Record> = items
            .into_iter()
            .filter_map(|item| Record::try_from(item).ok())
            .collect();

        DecodedPlantList {
            skipped: total - plantlist.len(),
            list: PlantList::new(plantlist),
            malformed: false,
        }
    }
}
