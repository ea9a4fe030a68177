//! The `check` command: validate a heap and decode it.

use std::fmt::Write;

use preserve_codec::{decode_report, DecodeError};
use preserve_heap::Heap;
use preserve_value::Environment;

/// Validate references, decode, and report any constructor fallbacks.
///
/// Fallbacks are warnings: the heap still decodes.
pub fn check<E: Environment + ?Sized>(heap: &Heap, env: &E) -> Result<String, DecodeError> {
    heap.validate()?;
    let output = decode_report(heap, env)?;

    let mut out = String::new();
    for fallback in &output.fallbacks {
        let _ = writeln!(out, "warning: {fallback}");
    }
    let _ = writeln!(
        out,
        "ok: {} records, root is {} ({})",
        heap.len(),
        heap.root().map_or("nothing", |r| r.tag().name()),
        output.value.type_of(),
    );
    Ok(out)
}
