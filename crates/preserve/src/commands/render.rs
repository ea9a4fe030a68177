//! The `render` command: decode a heap and print the value.

use preserve_codec::{decode, DecodeError};
use preserve_heap::Heap;
use preserve_value::Environment;

pub fn render<E: Environment + ?Sized>(heap: &Heap, env: &E) -> Result<String, DecodeError> {
    let value = decode(heap, env)?;
    Ok(format!("{value}\n"))
}
