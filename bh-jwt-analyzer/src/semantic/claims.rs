// Copyright (C) 2020-2026  The Blockhouse Technology Limited (TBTL).
//
// This program is free software: you can redistribute it and/or modify it
// under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or (at your
// option) any later version.
//
// This program is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public
// License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use serde_json::Value;

use crate::JsonObject;

/// The inferred type of a claim value.
#[derive(strum_macros::Display, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[strum(serialize_all = "lowercase")]
pub enum ValueKind {
    /// `null`
    Null,
    /// `true` or `false`
    Boolean,
    /// A number without a fractional part that fits into 64 bits.
    Integer,
    /// Any other number.
    Float,
    /// A string.
    String,
    /// An array.
    Array,
    /// A nested object.
    Object,
}

impl ValueKind {
    /// Infers the kind of the JSON `value`.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Boolean,
            Value::Number(number) if number.is_i64() || number.is_u64() => Self::Integer,
            Value::Number(_) => Self::Float,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }
}

/// The claims of a decoded segment, in source order.
///
/// Unlike a [`JsonObject`], a [`ClaimMap`] may hold the same name more than
/// once, which is what lets the type-consistency check observe duplicates
/// when claims come from somewhere other than a JSON decoder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClaimMap {
    claims: Vec<(String, Value)>,
}

impl ClaimMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a claim, keeping any earlier claim with the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.claims.push((name.into(), value));
    }

    /// Returns the value of the first claim named `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.claims
            .iter()
            .find(|(claim, _)| claim == name)
            .map(|(_, value)| value)
    }

    /// Returns `true` if a claim named `name` is present.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterates over the claims in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.claims.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// The number of claims, duplicates included.
    pub fn len(&self) -> usize {
        self.claims.len()
    }

    /// Returns `true` if there are no claims.
    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}

impl From<&JsonObject> for ClaimMap {
    fn from(object: &JsonObject) -> Self {
        object
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }
}

impl From<JsonObject> for ClaimMap {
    fn from(object: JsonObject) -> Self {
        object.into_iter().collect()
    }
}

impl<N: Into<String>> FromIterator<(N, Value)> for ClaimMap {
    fn from_iter<I: IntoIterator<Item = (N, Value)>>(iter: I) -> Self {
        Self {
            claims: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::json_object;

    #[test]
    fn test_value_kind() {
        assert_eq!(ValueKind::of(&json!(null)), ValueKind::Null);
        assert_eq!(ValueKind::of(&json!(false)), ValueKind::Boolean);
        assert_eq!(ValueKind::of(&json!(-3)), ValueKind::Integer);
        assert_eq!(ValueKind::of(&json!(u64::MAX)), ValueKind::Integer);
        assert_eq!(ValueKind::of(&json!(1.5)), ValueKind::Float);
        assert_eq!(ValueKind::of(&json!("1")), ValueKind::String);
        assert_eq!(ValueKind::of(&json!([])), ValueKind::Array);
        assert_eq!(ValueKind::of(&json!({})), ValueKind::Object);
        assert_eq!(ValueKind::Integer.to_string(), "integer");
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut claims = ClaimMap::new();
        claims.insert("sub", json!("alice"));
        claims.insert("sub", json!(7));

        assert_eq!(claims.len(), 2);
        assert_eq!(claims.get("sub"), Some(&json!("alice")));
        assert!(!claims.contains("iss"));
    }

    #[test]
    fn test_from_json_object() {
        let object = json_object!({ "iss": "issuer", "iat": 1 });
        let claims = ClaimMap::from(&object);

        assert_eq!(claims.len(), 2);
        assert_eq!(claims.get("iat"), Some(&json!(1)));
        assert_eq!(claims, ClaimMap::from(object));
        assert!(ClaimMap::new().is_empty());
    }
}
