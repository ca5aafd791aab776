//! Output formatting

use crate::CliError;
use serde_json::{json, Map, Value};

/// Result printer. Collects fields for `--json` mode and a text line for
/// humans; only one of the two is printed.
pub struct Output {
    json_mode: bool,
    fields: Map<String, Value>,
    message: Option<String>,
}

impl Output {
    /// Create a new output builder
    pub fn new(json_mode: bool) -> Self {
        Self {
            json_mode,
            fields: Map::new(),
            message: None,
        }
    }

    /// Add a string field
    pub fn field(mut self, key: &str, value: &str) -> Self {
        self.fields.insert(key.to_string(), Value::String(value.to_string()));
        self
    }

    /// Add an optional string field; `None` becomes `null`
    pub fn field_opt(mut self, key: &str, value: Option<&str>) -> Self {
        let value = value.map_or(Value::Null, |v| Value::String(v.to_string()));
        self.fields.insert(key.to_string(), value);
        self
    }

    /// Add a numeric field
    pub fn field_u64(mut self, key: &str, value: u64) -> Self {
        self.fields.insert(key.to_string(), Value::Number(value.into()));
        self
    }

    /// Add a boolean field
    pub fn field_bool(mut self, key: &str, value: bool) -> Self {
        self.fields.insert(key.to_string(), Value::Bool(value));
        self
    }

    /// Set the human-readable message
    pub fn message(mut self, msg: &str) -> Self {
        self.message = Some(msg.to_string());
        self
    }

    /// Print the output
    pub fn print(self) {
        if self.json_mode {
            let json = Value::Object(self.fields);
            println!("{}", serde_json::to_string_pretty(&json).unwrap_or_default());
        } else if let Some(msg) = self.message {
            println!("{}", msg);
        }
    }

    /// Report a failed command
    pub fn error(json_mode: bool, err: &CliError) {
        if json_mode {
            println!(
                "{}",
                json!({
                    "error": err.to_string(),
                    "kind": err.kind(),
                    "success": false
                })
            );
        } else {
            eprintln!("Error: {}", err);
        }
    }
}
