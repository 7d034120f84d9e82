//! JSON export of record values.

use serde_json::{json, Map, Value};

use super::{RecordData, RecordValue};
use crate::util::{Error, Result};
use crate::value::ScalarValue;

impl RecordValue {
    /// Structs become objects keyed by field name, arrays become lists.
    /// Enums with a known enumerator export its name.
    pub fn to_json(&self) -> Value {
        match &self.data {
            RecordData::Scalar(ScalarValue::Enum(id)) => match self.node().enumerator(*id) {
                Some(e) => json!(e.name),
                None => json!(id),
            },
            RecordData::Scalar(v) => v.to_json(),
            RecordData::Struct(fields) => {
                let mut object = Map::with_capacity(fields.len());
                for field in fields {
                    object.insert(field.name().to_string(), field.to_json());
                }
                Value::Object(object)
            }
            RecordData::Array(items) => Value::Array(items.iter().map(Self::to_json).collect()),
        }
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.to_json()).map_err(|e| Error::other(format!("JSON export failed: {e}")))
    }
}
