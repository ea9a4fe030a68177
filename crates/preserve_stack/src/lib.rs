//! Stack growth guard for graph traversal.
//!
//! The encoder and decoder walk value graphs depth-first, one native frame
//! per nesting level. A long linked list or a deeply nested array would
//! exhaust an 8MB thread stack well before the heap runs out, so every
//! recursive step goes through [`ensure_sufficient_stack`].
//!
//! - **Native targets**: `stacker` allocates a fresh segment when the
//!   remaining stack drops below the red zone.
//! - **WASM targets**: plain call; the engine owns the stack.
//!
//! ```text
//! fn encode_value(&mut self, value: &Value) -> Result<SlotId, EncodeError> {
//!     ensure_sufficient_stack(|| self.encode_value_inner(value))
//! }
//! ```

/// Remaining stack below which a new segment is allocated (128KB).
///
/// One encode frame holds a borrowed child snapshot plus the error enum,
/// so the zone is a little wider than a parser would need.
pub const RED_ZONE: usize = 128 * 1024;

/// Size of each freshly allocated stack segment (2MB).
pub const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Run `f`, growing the stack first if less than [`RED_ZONE`] remains.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

/// WASM version: call directly.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests;
