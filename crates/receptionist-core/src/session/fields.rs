use serde::{Deserialize, Serialize};

/// Number of intake fields the operator console expects per call.
pub const EXPECTED_FIELD_COUNT: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectedField {
    pub name: String,
    pub value: String,
}

/// Fields reported by the remote agent. Keyed by name, last write wins;
/// iteration follows first-seen order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectedFields {
    fields: Vec<CollectedField>,
}

impl CollectedFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the field was not present before.
    pub fn upsert(&mut self, name: impl Into<String>, value: impl Into<String>) -> bool {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(existing) => {
                existing.value = value;
                false
            }
            None => {
                self.fields.push(CollectedField { name, value });
                true
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &CollectedField> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }
}
