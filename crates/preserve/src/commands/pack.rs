//! The `pack` command: encode a plain JSON document as a heap.

use preserve_codec::{encode, EncodeError};
use preserve_heap::HeapError;
use preserve_value::{Environment, Value};

#[derive(Debug, thiserror::Error)]
pub enum PackError {
    #[error("invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Heap(#[from] HeapError),
}

/// Convert a JSON document into a value: objects become plain objects.
pub fn value_from_json(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(*b),
        serde_json::Value::Number(n) => Value::number(n.as_f64().unwrap_or(f64::NAN)),
        serde_json::Value::String(s) => Value::string(s.as_str()),
        serde_json::Value::Array(items) => Value::array(items.iter().map(value_from_json).collect()),
        serde_json::Value::Object(props) => {
            Value::object(props.iter().map(|(k, v)| (k.as_str(), value_from_json(v))))
        }
    }
}

/// Encode a JSON document and return the heap's pretty wire form.
pub fn pack<E: Environment + ?Sized>(text: &str, env: &E) -> Result<String, PackError> {
    let json: serde_json::Value = serde_json::from_str(text)?;
    let heap = encode(&value_from_json(&json), env)?;
    let mut out = heap.to_json_pretty()?;
    out.push('\n');
    Ok(out)
}
