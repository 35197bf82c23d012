//! Tri-state field used by partial-update requests.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A field in a partial-update request.
///
/// Distinguishes a field that was left out of the request ([`Patch::Unset`])
/// from one explicitly cleared ([`Patch::Null`]) and one given a value
/// ([`Patch::Value`]). Request structs mark these fields with
/// `#[serde(default, skip_serializing_if = "Patch::is_unset")]` so a missing
/// JSON key stays `Unset` while `null` becomes `Null`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Patch<T> {
    /// The field was not part of the request.
    #[default]
    Unset,
    /// The field was explicitly cleared.
    Null,
    /// The field was set to a value.
    Value(T),
}

impl<T> Patch<T> {
    /// `true` when the field was omitted.
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    /// `true` when the field was present (either cleared or given a value).
    pub fn is_set(&self) -> bool {
        !self.is_unset()
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::Value(v),
            None => Self::Null,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Self::from)
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(v) => serializer.serialize_some(v),
            _ => serializer.serialize_none(),
        }
    }
}
