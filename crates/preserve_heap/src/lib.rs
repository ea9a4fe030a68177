//! Heap record model for the preserve codec.
//!
//! A heap is a flat, ordered sequence of tagged records. A record's position
//! is its [`SlotId`]; containers refer to other records only through slot
//! ids, so shared and cyclic value graphs become plain index lookups. The
//! root value always lives at [`SlotId::ROOT`].
//!
//! The JSON wire form is an object keyed by decimal slot id:
//!
//! ```text
//! {"0": {"type": "array", "value": [1, 2]},
//!  "1": {"type": "number", "value": 1},
//!  "2": {"type": "number", "value": 1}}
//! ```

mod error;
mod heap;
mod number;
mod record;
mod slot;
mod tag;
mod wire;

pub use error::HeapError;
pub use heap::{Heap, TagCounts};
pub use record::{
    Entry, ErrorPayload, FunctionPayload, Record, RegExpPayload, Sign, TypedArrayPayload,
};
pub use slot::SlotId;
pub use tag::Tag;
