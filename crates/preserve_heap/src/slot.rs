use std::fmt;

use serde::{Deserialize, Serialize};

/// Position of a record in its heap.
///
/// Slot ids are only meaningful within the heap that produced them.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotId(u32);

impl SlotId {
    /// The root value's slot.
    pub const ROOT: SlotId = SlotId(0);

    #[inline]
    pub const fn new(raw: u32) -> Self {
        SlotId(raw)
    }

    /// Slot id for a record index.
    ///
    /// # Panics
    /// Panics if `index` does not fit in 32 bits.
    #[inline]
    pub fn from_index(index: usize) -> Self {
        match u32::try_from(index) {
            Ok(raw) => SlotId(raw),
            Err(_) => panic!("heap slot index {index} exceeds u32::MAX"),
        }
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SlotId({})", self.0)
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for SlotId {
    fn from(raw: u32) -> Self {
        SlotId(raw)
    }
}
