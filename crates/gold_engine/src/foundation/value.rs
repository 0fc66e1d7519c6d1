//! Untyped argument bags
//!
//! Prefabs and scene definitions carry free-form arguments for component,
//! transform and collider generators. They decode into a [`Value`] tree; each
//! generator pulls the keys it understands through the typed accessors on
//! [`ArgsExt`], falling back to its own defaults when a key is missing or has
//! the wrong shape.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::math::{Color, Vec2};

/// String-keyed argument map
pub type Args = BTreeMap<String, Value>;

/// A decoded structured-data value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    /// Explicit null
    #[default]
    Null,
    /// Boolean
    Bool(bool),
    /// Any number (integers included)
    Number(f64),
    /// String
    String(String),
    /// Ordered list
    List(Vec<Value>),
    /// String-keyed map
    Map(Args),
}

impl Value {
    /// Numeric value, if this is a number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric value narrowed to `f32`
    pub fn as_f32(&self) -> Option<f32> {
        self.as_f64().map(|n| n as f32)
    }

    /// Boolean value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// String slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// List items
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Map entries
    pub fn as_map(&self) -> Option<&Args> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Vector from `{"X": .., "Y": ..}` or `[x, y]`
    ///
    /// A map with a missing or non-numeric component is rejected.
    pub fn as_vector(&self) -> Option<Vec2> {
        match self {
            Self::Map(map) => {
                let x = map.get("X").or_else(|| map.get("x"))?.as_f32()?;
                let y = map.get("Y").or_else(|| map.get("y"))?.as_f32()?;
                Some(Vec2::new(x, y))
            }
            Self::List(items) => match items.as_slice() {
                [x, y] => Some(Vec2::new(x.as_f32()?, y.as_f32()?)),
                _ => None,
            },
            _ => None,
        }
    }

    /// Color from `{"R","G","B","A"}`
    ///
    /// Missing color channels read as 0, a missing alpha as 255.
    pub fn as_color(&self) -> Option<Color> {
        let map = self.as_map()?;
        let channel = |key: &str, default: u8| {
            map.get(key)
                .and_then(Value::as_f64)
                .map_or(default, |v| v.clamp(0.0, 255.0) as u8)
        };
        Some(Color::rgba(
            channel("R", 0),
            channel("G", 0),
            channel("B", 0),
            channel("A", 255),
        ))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec2> for Value {
    fn from(value: Vec2) -> Self {
        let mut map = Args::new();
        map.insert("X".to_string(), value.x.into());
        map.insert("Y".to_string(), value.y.into());
        Self::Map(map)
    }
}

/// Typed lookups on an argument bag
pub trait ArgsExt {
    /// Float argument
    fn float(&self, key: &str) -> Option<f32>;
    /// Boolean argument
    fn boolean(&self, key: &str) -> Option<bool>;
    /// String argument
    fn string(&self, key: &str) -> Option<&str>;
    /// Vector argument
    fn vector(&self, key: &str) -> Option<Vec2>;
    /// Color argument
    fn color(&self, key: &str) -> Option<Color>;
    /// List of vectors; entries that are not vectors are skipped
    fn vectors(&self, key: &str) -> Option<Vec<Vec2>>;
}

impl ArgsExt for Args {
    fn float(&self, key: &str) -> Option<f32> {
        self.get(key).and_then(Value::as_f32)
    }

    fn boolean(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    fn string(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    fn vector(&self, key: &str) -> Option<Vec2> {
        self.get(key).and_then(Value::as_vector)
    }

    fn color(&self, key: &str) -> Option<Color> {
        self.get(key).and_then(Value::as_color)
    }

    fn vectors(&self, key: &str) -> Option<Vec<Vec2>> {
        let items = self.get(key)?.as_list()?;
        Some(items.iter().filter_map(Value::as_vector).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(json: &str) -> Args {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_decodes_every_shape() {
        let bag = args(r#"{"n": 3, "f": 1.5, "b": true, "s": "hi", "l": [1, 2], "m": {"X": 1}, "z": null}"#);
        assert_eq!(bag["n"], Value::Number(3.0));
        assert_eq!(bag.float("f"), Some(1.5));
        assert_eq!(bag.boolean("b"), Some(true));
        assert_eq!(bag.string("s"), Some("hi"));
        assert_eq!(bag.vector("l"), Some(Vec2::new(1.0, 2.0)));
        assert!(bag["m"].as_map().is_some());
        assert_eq!(bag["z"], Value::Null);
    }

    #[test]
    fn test_wrong_type_reads_as_none() {
        let bag = args(r#"{"Radius": "big", "Size": {"X": 1}}"#);
        assert_eq!(bag.float("Radius"), None);
        assert_eq!(bag.vector("Size"), None);
        assert_eq!(bag.float("Missing"), None);
    }

    #[test]
    fn test_color_defaults_alpha() {
        let bag = args(r#"{"FillColor": {"R": 300, "G": 10, "B": 20}}"#);
        assert_eq!(bag.color("FillColor"), Some(Color::rgba(255, 10, 20, 255)));
    }

    #[test]
    fn test_decodes_from_ron() {
        let bag: Args = ron::from_str(r#"{"Speed": 40.0, "Keys": ["Up", "Down"]}"#).unwrap();
        assert_eq!(bag.float("Speed"), Some(40.0));
        assert_eq!(bag["Keys"].as_list().map(<[Value]>::len), Some(2));
    }
}
