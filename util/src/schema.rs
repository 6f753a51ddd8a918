//! Declarative validation of JSON documents
//!
//! A [`Schema`] describes the expected shape of a `serde_json::Value`: the type of each value,
//! numeric minimums, which keys an object must and may contain, and optionally a named custom
//! validator for string values. Custom validators are registered by name in a [`Validators`] set
//! and looked up while the schema is interpreted, so the schema remains the single description of
//! a valid document.
//!
//! Validation does not stop at the first problem, every violation found in the document is
//! reported in the returned [`SchemaError`].

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Path used to refer to the top level of the document.
const ROOT_PATH: &str = "<root>";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Schema for a JSON object.
#[derive(Debug)]
pub struct ObjectSchema {
    required: Vec<&'static str>,
    properties: Vec<(&'static str, Schema)>,
    additional: Additional,
}

/// A set of named custom string validators.
///
/// A validator returns `true` if the string is valid.
#[derive(Default)]
pub struct Validators<'a> {
    validators: HashMap<&'static str, Box<dyn Fn(&str) -> bool + 'a>>,
}

/// A single problem found in a document.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    /// Location of the offending value, for example `control_machines[1]`
    pub path: String,

    /// Description of the problem
    pub message: String,
}

/// Error returned when a document does not match its schema.
#[derive(Debug, Error)]
#[error("{} schema violation(s): {}", .violations.len(), join_violations(.violations))]
pub struct SchemaError {
    pub violations: Vec<Violation>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The expected shape of a JSON value.
#[derive(Debug)]
pub enum Schema {
    Object(ObjectSchema),

    /// An array whose items all match the inner schema
    Array(Box<Schema>),

    /// A string, optionally checked by the named custom validator
    String {
        validator: Option<&'static str>,
        min_length: usize,
    },

    /// A whole number with an optional inclusive minimum
    Integer(Option<i64>),

    /// Any number with an optional inclusive minimum
    Number(Option<f64>),

    Boolean,
}

/// How an object treats keys which are not declared as properties.
#[derive(Debug)]
pub enum Additional {
    Allowed,
    Forbidden,

    /// Undeclared keys are allowed but their values must match the schema
    Matching(Box<Schema>),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Schema {
    /// A string with no custom validation.
    pub fn string() -> Self {
        Schema::String {
            validator: None,
            min_length: 0,
        }
    }

    /// A string which must contain at least one character.
    pub fn non_empty_string() -> Self {
        Schema::String {
            validator: None,
            min_length: 1,
        }
    }

    /// A string which must pass the named custom validator.
    pub fn validated_string(validator: &'static str) -> Self {
        Schema::String {
            validator: Some(validator),
            min_length: 0,
        }
    }

    /// An integer which must be at least `minimum`.
    pub fn integer_min(minimum: i64) -> Self {
        Schema::Integer(Some(minimum))
    }

    /// A number which must be at least `minimum`.
    pub fn number_min(minimum: f64) -> Self {
        Schema::Number(Some(minimum))
    }

    /// An array of items matching `items`.
    pub fn array(items: Schema) -> Self {
        Schema::Array(Box::new(items))
    }

    /// Validate a document against this schema.
    pub fn validate(&self, value: &Value, validators: &Validators) -> Result<(), SchemaError> {
        let mut violations = Vec::new();
        self.check(value, ROOT_PATH, validators, &mut violations);

        if violations.is_empty() {
            Ok(())
        } else {
            Err(SchemaError { violations })
        }
    }

    /// Name of the JSON type this schema accepts.
    fn type_name(&self) -> &'static str {
        match self {
            Schema::Object(_) => "object",
            Schema::Array(_) => "array",
            Schema::String { .. } => "string",
            Schema::Integer(_) => "integer",
            Schema::Number(_) => "number",
            Schema::Boolean => "boolean",
        }
    }

    fn check(&self, value: &Value, path: &str, validators: &Validators, out: &mut Vec<Violation>) {
        match (self, value) {
            (Schema::Object(object), Value::Object(map)) => object.check(map, path, validators, out),
            (Schema::Array(items), Value::Array(values)) => {
                for (i, v) in values.iter().enumerate() {
                    items.check(v, &format!("{}[{}]", path, i), validators, out);
                }
            }
            (
                Schema::String {
                    validator,
                    min_length,
                },
                Value::String(s),
            ) => {
                if s.chars().count() < *min_length {
                    out.push(Violation::new(path, format!("{} is too short", value)));
                }

                if let Some(name) = validator {
                    match validators.get(name) {
                        Some(f) if f(s.as_str()) => (),
                        Some(_) => out.push(Violation::new(
                            path,
                            format!("'{}' is not a valid {}", s, name.replace('_', " ")),
                        )),
                        None => out.push(Violation::new(
                            path,
                            format!("no validator is registered for '{}'", name),
                        )),
                    }
                }
            }
            (Schema::Integer(minimum), Value::Number(n)) if n.is_i64() || n.is_u64() => {
                let v = n
                    .as_i64()
                    .map(i128::from)
                    .or_else(|| n.as_u64().map(i128::from));

                if let (Some(min), Some(v)) = (minimum, v) {
                    if v < i128::from(*min) {
                        out.push(Violation::new(
                            path,
                            format!("{} is less than the minimum of {}", v, min),
                        ));
                    }
                }
            }
            (Schema::Number(minimum), Value::Number(n)) => {
                if let (Some(min), Some(v)) = (minimum, n.as_f64()) {
                    if v < *min {
                        out.push(Violation::new(
                            path,
                            format!("{} is less than the minimum of {}", n, min),
                        ));
                    }
                }
            }
            (Schema::Boolean, Value::Bool(_)) => (),
            (schema, value) => out.push(Violation::new(
                path,
                format!("{} is not of type '{}'", value, schema.type_name()),
            )),
        }
    }
}

impl ObjectSchema {
    /// An object with no required keys which allows any additional keys.
    pub fn new() -> Self {
        Self {
            required: Vec::new(),
            properties: Vec::new(),
            additional: Additional::Allowed,
        }
    }

    /// Set the keys which must be present.
    pub fn required(mut self, keys: &[&'static str]) -> Self {
        self.required.extend_from_slice(keys);
        self
    }

    /// Declare a key and the schema its value must match.
    pub fn property(mut self, key: &'static str, schema: Schema) -> Self {
        self.properties.push((key, schema));
        self
    }

    /// Set how undeclared keys are treated.
    pub fn additional(mut self, additional: Additional) -> Self {
        self.additional = additional;
        self
    }

    /// Reject any undeclared keys.
    pub fn closed(self) -> Self {
        self.additional(Additional::Forbidden)
    }

    fn check(
        &self,
        map: &Map<String, Value>,
        path: &str,
        validators: &Validators,
        out: &mut Vec<Violation>,
    ) {
        for key in self.required.iter() {
            if !map.contains_key(*key) {
                out.push(Violation::new(path, format!("'{}' is a required property", key)));
            }
        }

        let mut unexpected = Vec::new();

        for (key, value) in map.iter() {
            let child_path = if path == ROOT_PATH {
                key.clone()
            } else {
                format!("{}.{}", path, key)
            };

            match self.properties.iter().find(|(k, _)| *k == key.as_str()) {
                Some((_, schema)) => schema.check(value, &child_path, validators, out),
                None => match &self.additional {
                    Additional::Allowed => (),
                    Additional::Forbidden => unexpected.push(format!("'{}'", key)),
                    Additional::Matching(schema) => {
                        schema.check(value, &child_path, validators, out)
                    }
                },
            }
        }

        if !unexpected.is_empty() {
            out.push(Violation::new(
                path,
                format!(
                    "Additional properties are not allowed ({} {} unexpected)",
                    unexpected.join(", "),
                    if unexpected.len() == 1 { "was" } else { "were" }
                ),
            ));
        }
    }
}

impl Default for ObjectSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ObjectSchema> for Schema {
    fn from(object: ObjectSchema) -> Self {
        Schema::Object(object)
    }
}

impl<'a> Validators<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a validator under the given name, replacing any existing one.
    pub fn register<F>(mut self, name: &'static str, validator: F) -> Self
    where
        F: Fn(&str) -> bool + 'a,
    {
        self.validators.insert(name, Box::new(validator));
        self
    }

    fn get(&self, name: &str) -> Option<&(dyn Fn(&str) -> bool + 'a)> {
        self.validators.get(name).map(|b| b.as_ref())
    }
}

impl Violation {
    pub fn new<S: Into<String>>(path: &str, message: S) -> Self {
        Self {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

impl SchemaError {
    /// An error with a single violation.
    pub fn single<S: Into<String>>(path: &str, message: S) -> Self {
        Self {
            violations: vec![Violation::new(path, message)],
        }
    }

    /// Returns true if any violation is located at, or names, the given key.
    pub fn mentions(&self, key: &str) -> bool {
        let quoted = format!("'{}'", key);
        let indexed = format!("{}[", key);

        self.violations.iter().any(|v| {
            v.path == key || v.path.starts_with(&indexed) || v.message.contains(&quoted)
        })
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
