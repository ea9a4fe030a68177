use crate::{SlotId, Tag};

/// Failure to read or validate a heap.
#[derive(Debug, thiserror::Error)]
pub enum HeapError {
    #[error("malformed heap JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A record names a kind outside the closed tag set.
    #[error("record {slot} has unknown type `{tag}`")]
    UnreachableTag { slot: SlotId, tag: String },

    #[error("record {slot} has a `{tag}` payload of the wrong shape: {source}")]
    MalformedPayload {
        slot: SlotId,
        tag: Tag,
        source: serde_json::Error,
    },

    #[error("heap key `{key}` is not a slot id")]
    InvalidSlotKey { key: String },

    #[error("heap has no record {slot}")]
    MissingSlot { slot: SlotId },

    #[error("`{tag}` records cannot be reserved")]
    NotAContainer { tag: Tag },

    #[error("heap has no records")]
    Empty,

    #[error("record {slot} refers to {target}, but the heap has {len} records")]
    DanglingReference {
        slot: SlotId,
        target: SlotId,
        len: usize,
    },
}
