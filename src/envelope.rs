use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{InvokeError, Result};

pub const ERROR_TYPE_HEADER: &str = "x-amzn-ErrorType";

/// API Gateway proxy response as printed by `sam local invoke`.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    #[serde(rename = "statusCode")]
    pub status_code: i64,
    #[serde(default)]
    pub headers: Option<Map<String, Value>>,
    pub body: String,
}

/// Outcome of one invocation, ready to render.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Report {
    Success {
        status_code: i64,
        attributes: Option<Value>,
    },
    Failure {
        status_code: i64,
        error_type: String,
        message: String,
    },
}

impl Report {
    pub fn status_code(&self) -> i64 {
        match self {
            Report::Success { status_code, .. } | Report::Failure { status_code, .. } => {
                *status_code
            }
        }
    }
}

impl Envelope {
    pub fn parse(stdout: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(stdout)?)
    }

    pub fn decode_body(&self) -> Result<Map<String, Value>> {
        match serde_json::from_str(&self.body)? {
            Value::Object(map) => Ok(map),
            other => Err(InvokeError::envelope(format!(
                "body must decode to an object, got {other}"
            ))),
        }
    }

    pub fn into_report(self) -> Result<Report> {
        let mut body = self.decode_body()?;
        if self.status_code == 200 {
            let attributes = match body.remove("attributes") {
                Some(v) if is_truthy(&v) => Some(decode_attributes(v)?),
                _ => None,
            };
            return Ok(Report::Success {
                status_code: self.status_code,
                attributes,
            });
        }

        let error_type = self
            .headers
            .as_ref()
            .and_then(|headers| headers.get(ERROR_TYPE_HEADER))
            .map(display_value)
            .ok_or_else(|| {
                InvokeError::envelope(format!("missing '{ERROR_TYPE_HEADER}' header"))
            })?;
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .map(String::from)
            .ok_or_else(|| InvokeError::envelope("body has no 'message' string"))?;
        Ok(Report::Failure {
            status_code: self.status_code,
            error_type,
            message,
        })
    }
}

/// Attributes usually arrive as a JSON document inside a string.
fn decode_attributes(value: Value) -> Result<Value> {
    match value {
        Value::String(s) => Ok(serde_json::from_str(&s)?),
        other => Ok(other),
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `null`, `false`, zero and empty strings, arrays or objects are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
