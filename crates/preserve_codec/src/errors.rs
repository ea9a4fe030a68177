//! Encode and decode failures.

use preserve_heap::{HeapError, SlotId};
use preserve_value::DomError;

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// The value's runtime type is outside the classification set.
    #[error("cannot encode a value of type `{type_name}`")]
    UnsupportedType { type_name: String },

    #[error("cannot encode a DOM node: the environment has no DOM codec")]
    DomCodecUnavailable,

    /// Only produced when writing the wire form.
    #[error(transparent)]
    Heap(#[from] HeapError),
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The heap could not be read; carries an unknown-tag failure.
    #[error(transparent)]
    Heap(#[from] HeapError),

    #[error("cannot decode an empty heap")]
    EmptyHeap,

    #[error("slot {slot} is out of range for a heap of {len} records")]
    DanglingSlot { slot: SlotId, len: usize },

    #[error("record {slot}: `{text}` is not a decimal big integer")]
    InvalidBigInt { slot: SlotId, text: String },

    #[error("record {slot}: a {found} cannot be a property key")]
    InvalidPropertyKey { slot: SlotId, found: String },

    #[error("record {slot}: invalid regular expression flags `{flags}`")]
    InvalidRegExpFlags { slot: SlotId, flags: String },

    #[error("record {slot}: the environment has no DOM codec")]
    DomCodecUnavailable { slot: SlotId },

    #[error("record {slot}: malformed DOM node text: {source}")]
    Dom { slot: SlotId, source: DomError },
}
