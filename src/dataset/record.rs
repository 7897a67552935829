// src/dataset/record.rs

use serde::ser::{Serialize, SerializeMap, Serializer};

/// One CSV row: column name → raw value, in header order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    /// Pair a header with one row of values.
    pub fn from_row<'a, H, V>(headers: H, values: V) -> Self
    where
        H: IntoIterator<Item = &'a str>,
        V: IntoIterator<Item = &'a str>,
    {
        Self {
            fields: headers
                .into_iter()
                .zip(values)
                .map(|(h, v)| (h.to_string(), v.to_string()))
                .collect(),
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    /// Replace the value of an existing column. Returns false if the column is absent.
    pub fn set(&mut self, column: &str, value: String) -> bool {
        match self.fields.iter_mut().find(|(name, _)| name == column) {
            Some((_, slot)) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(_, v)| v.as_str())
    }
}

// Serialized as a JSON object keeping header order.
impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
