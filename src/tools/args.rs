//! Decoding of model-supplied tool arguments.
//!
//! The model sends arguments as a serialized JSON object. Each value is
//! matched by name against the tool's declared parameters and coerced to the
//! declared type; anything that does not fit is reported as a decode error
//! and becomes a tool failure upstream.

use crate::tools::{ParamType, ToolDescriptor};
use anyhow::{anyhow, Result};
use serde_json::{Map, Value};

/// Arguments checked against a [`ToolDescriptor`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolArgs {
    values: Map<String, Value>,
}

impl ToolArgs {
    /// Decode `raw` for `descriptor`. The error string is the failure reason.
    pub fn decode(descriptor: &ToolDescriptor, raw: &str) -> Result<Self, String> {
        let parsed: Value = if raw.trim().is_empty() {
            Value::Object(Map::new())
        } else {
            serde_json::from_str(raw).map_err(|e| format!("invalid arguments JSON: {e}"))?
        };

        let object = match parsed {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(format!(
                    "arguments must be a JSON object, got {}",
                    json_kind(&other)
                ))
            }
        };

        let mut values = Map::new();
        for (name, value) in object {
            let spec = descriptor
                .parameter(&name)
                .ok_or_else(|| format!("unexpected argument '{name}'"))?;
            if value.is_null() && !spec.required {
                continue;
            }
            let coerced = coerce(spec.kind, value)
                .map_err(|got| format!("argument '{name}' must be {}, got {got}", spec.kind.as_str()))?;
            values.insert(name, coerced);
        }

        if let Some(missing) = descriptor
            .parameters
            .iter()
            .find(|p| p.required && !values.contains_key(&p.name))
        {
            return Err(format!("missing required argument '{}'", missing.name));
        }

        Ok(Self { values })
    }

    /// Build arguments directly, bypassing validation. Test helper.
    pub fn from_map(values: Map<String, Value>) -> Self {
        Self { values }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn str(&self, name: &str) -> Result<&str> {
        self.opt_str(name)
            .ok_or_else(|| anyhow!("Missing '{}' argument", name))
    }

    pub fn opt_str(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(Value::as_str)
    }

    pub fn int(&self, name: &str) -> Result<i64> {
        self.values
            .get(name)
            .and_then(Value::as_i64)
            .ok_or_else(|| anyhow!("Missing '{}' argument", name))
    }

    pub fn number(&self, name: &str) -> Result<f64> {
        self.values
            .get(name)
            .and_then(Value::as_f64)
            .ok_or_else(|| anyhow!("Missing '{}' argument", name))
    }

    pub fn bool(&self, name: &str) -> Result<bool> {
        self.values
            .get(name)
            .and_then(Value::as_bool)
            .ok_or_else(|| anyhow!("Missing '{}' argument", name))
    }
}

/// Coerce a JSON value to `kind`; on mismatch return a description of what we got.
fn coerce(kind: ParamType, value: Value) -> Result<Value, String> {
    match (kind, value) {
        (ParamType::String, Value::String(s)) => Ok(Value::String(s)),
        (ParamType::String, Value::Number(n)) => Ok(Value::String(n.to_string())),
        (ParamType::String, Value::Bool(b)) => Ok(Value::String(b.to_string())),

        (ParamType::Integer, Value::Number(n)) => match n.as_i64() {
            Some(i) => Ok(Value::from(i)),
            None => match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(Value::from(f as i64)),
                _ => Err(format!("number {n}")),
            },
        },
        (ParamType::Integer, Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| format!("string \"{s}\"")),

        (ParamType::Number, Value::Number(n)) => Ok(Value::Number(n)),
        (ParamType::Number, Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| format!("string \"{s}\"")),

        (ParamType::Boolean, Value::Bool(b)) => Ok(Value::Bool(b)),
        (ParamType::Boolean, Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(format!("string \"{s}\"")),
        },

        (_, other) => Err(json_kind(&other).to_string()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
