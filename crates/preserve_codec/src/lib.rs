//! Encoder and decoder between runtime values and heaps.
//!
//! [`encode`] walks a value depth-first and appends one record per distinct
//! value to a fresh [`Heap`]; reference kinds are deduplicated by identity,
//! primitives never are. [`decode`] rebuilds a value graph from slot 0,
//! memoizing by slot so shared references and cycles come back shared.
//!
//! Both directions consult an [`Environment`] for the well-known
//! constructors and the DOM text codec.
//!
//! ```text
//! let realm = Realm::standard();
//! let heap = encode(&value, &realm)?;
//! let copy = decode(&heap, &realm)?;
//! assert!(copy.deep_equals(&value));
//! ```

mod decode;
mod encode;
mod errors;

pub use decode::{decode, decode_report, ConstructorUnavailable, DecodeOutput, Decoder};
pub use encode::{encode, Encoder};
pub use errors::{DecodeError, EncodeError};

use preserve_heap::Heap;
use preserve_value::{Environment, Value};

/// Encode straight to the JSON wire form.
pub fn encode_json<E: Environment + ?Sized>(value: &Value, env: &E) -> Result<String, EncodeError> {
    let heap = encode(value, env)?;
    Ok(heap.to_json()?)
}

/// Parse the JSON wire form and decode it.
pub fn decode_json<E: Environment + ?Sized>(text: &str, env: &E) -> Result<Value, DecodeError> {
    let heap = Heap::from_json(text)?;
    decode(&heap, env)
}
