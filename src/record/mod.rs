use std::collections::BTreeMap;
use std::fmt;

use crate::level::Level;
use crate::logger::Logger;

/// Primitive field value of a structured record.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Fallback for anything non-primitive, rendered as compact JSON.
    Other(serde_json::Value),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Quoted verbatim, no escaping.
            Value::Str(s) => write!(f, "\"{s}\""),
            Value::Int(i) => write!(f, "{i}"),
            // Rust never renders f64 in scientific notation here, so this
            // stays plain fixed-point decimal.
            Value::Float(x) => write!(f, "{x}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Other(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Other(v)
    }
}

/// A named key-value payload serialized into one log line. `fields: None`
/// (never populated) is distinct from an empty mapping: the former serializes
/// to the empty string, the latter to `<name> {}`.
#[derive(Debug, Clone)]
pub struct Record {
    pub level: Level,
    pub sub_module: String,
    pub name: String,
    pub fields: Option<BTreeMap<String, Value>>,
}

impl Record {
    pub fn new(level: Level, name: impl Into<String>) -> Self {
        Self {
            level,
            sub_module: String::new(),
            name: name.into(),
            fields: None,
        }
    }

    pub fn with_sub_module(mut self, sub_module: impl Into<String>) -> Self {
        self.sub_module = sub_module.into();
        self
    }

    pub fn with_fields(mut self, fields: BTreeMap<String, Value>) -> Self {
        self.fields = Some(fields);
        self
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Serializes to `<name> {"<k1>": <v1>, "<k2>": <v2>, ...}\n` with keys
    /// in lexicographic ascending order, so identical mappings produce
    /// byte-identical output regardless of insertion order.
    pub fn serialize(&self) -> String {
        let Some(fields) = &self.fields else {
            return String::new();
        };
        let body: Vec<String> = fields
            .iter()
            .map(|(key, value)| format!("\"{key}\": {value}"))
            .collect();
        format!("{} {{{}}}\n", self.name, body.join(", "))
    }
}

impl Logger {
    /// Serializes `record` and routes it through the leveled path at the
    /// record's level, under a sub-logger scoped to its sub-module. A record
    /// with no fields still produces a (message-less) line.
    #[track_caller]
    pub fn emit(&self, record: &Record) {
        self.sub(&record.sub_module)
            .log(record.level, record.serialize());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::Options;
    use proptest::prelude::*;

    #[test]
    fn test_keys_are_sorted() {
        let record = Record::new(Level::Info, "evt").field("b", 1).field("a", "x");
        assert_eq!(record.serialize(), "evt {\"a\": \"x\", \"b\": 1}\n");
    }

    #[test]
    fn test_absent_fields_vs_empty_fields() {
        let absent = Record::new(Level::Info, "evt");
        assert_eq!(absent.serialize(), "");

        let empty = Record::new(Level::Info, "evt").with_fields(BTreeMap::new());
        assert_eq!(empty.serialize(), "evt {}\n");
    }

    #[test]
    fn test_value_rendering() {
        let record = Record::new(Level::Info, "evt")
            .field("flag", true)
            .field("ratio", 0.5)
            .field("count", 7)
            .field("quote", "say \"hi\"")
            .field("rest", serde_json::json!({"k": 1}));
        assert_eq!(
            record.serialize(),
            "evt {\"count\": 7, \"flag\": true, \"quote\": \"say \"hi\"\", \
             \"ratio\": 0.5, \"rest\": {\"k\":1}}\n"
        );
    }

    #[test]
    fn test_emit_routes_through_leveled_path() {
        let path = format!("/tmp/linelog_test_emit_{}.log", std::process::id());
        let logger = Logger::new(Options {
            module: "test".to_string(),
            min_level: Some(Level::Warn),
            file_path: path.clone(),
            mirror_to_file: true,
            suppress_stdout: true,
            ..Options::default()
        })
        .unwrap();

        logger.emit(&Record::new(Level::Debug, "dropped").field("a", 1));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");

        logger.emit(
            &Record::new(Level::Error, "evt")
                .with_sub_module("audit")
                .field("a", 1),
        );
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[test/audit ERROR] evt {\"a\": 1}"));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_emit_without_fields_still_writes_a_line() {
        let path = format!("/tmp/linelog_test_emit_bare_{}.log", std::process::id());
        let logger = Logger::new(Options {
            module: "test".to_string(),
            file_path: path.clone(),
            mirror_to_file: true,
            suppress_stdout: true,
            ..Options::default()
        })
        .unwrap();

        logger.emit(&Record::new(Level::Info, "evt"));
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 1);
        assert!(contents.contains("[test INFO] "));
        assert!(!contents.contains("evt"));
        std::fs::remove_file(&path).ok();
    }

    proptest! {
        #[test]
        fn serialization_is_insertion_order_independent(
            fields in proptest::collection::btree_map("[a-z]{1,8}", any::<i64>(), 0..8)
        ) {
            let pairs: Vec<(String, i64)> = fields.into_iter().collect();
            let forward: BTreeMap<String, Value> = pairs
                .iter()
                .map(|(k, v)| (k.clone(), Value::from(*v)))
                .collect();
            let reversed: BTreeMap<String, Value> = pairs
                .iter()
                .rev()
                .map(|(k, v)| (k.clone(), Value::from(*v)))
                .collect();

            let a = Record::new(Level::Info, "evt").with_fields(forward).serialize();
            let b = Record::new(Level::Info, "evt").with_fields(reversed).serialize();
            prop_assert_eq!(a, b);
        }
    }
}
