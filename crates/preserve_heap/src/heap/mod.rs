//! The heap arena.

use std::fmt;

use crate::{HeapError, Record, SlotId, Tag};

/// Ordered record arena; a record's index is its slot id.
///
/// Built by appending. Containers are reserved first and filled once their
/// children have slots, so a cycle back to a container finds its slot
/// already assigned.
#[derive(Clone, Default, PartialEq)]
pub struct Heap {
    records: Vec<Record>,
}

impl Heap {
    pub fn new() -> Self {
        Heap {
            records: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Heap {
            records: Vec::with_capacity(capacity),
        }
    }

    /// Append a record and return its slot.
    pub fn push(&mut self, record: Record) -> SlotId {
        let slot = SlotId::from_index(self.records.len());
        self.records.push(record);
        slot
    }

    /// Append an empty container of kind `tag`, to be filled later.
    pub fn reserve(&mut self, tag: Tag) -> Result<SlotId, HeapError> {
        let record = Record::empty_container(tag).ok_or(HeapError::NotAContainer { tag })?;
        Ok(self.push(record))
    }

    /// Replace the record at a reserved slot.
    ///
    /// Returns `false` (leaving the heap unchanged) if the slot is out of
    /// range or holds a record of another kind.
    pub fn fill(&mut self, slot: SlotId, record: Record) -> bool {
        match self.records.get_mut(slot.index()) {
            Some(existing) if existing.tag() == record.tag() => {
                *existing = record;
                true
            }
            _ => false,
        }
    }

    #[inline]
    pub fn get(&self, slot: SlotId) -> Option<&Record> {
        self.records.get(slot.index())
    }

    /// The root record (slot 0).
    #[inline]
    pub fn root(&self) -> Option<&Record> {
        self.get(SlotId::ROOT)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &Record)> {
        self.records
            .iter()
            .enumerate()
            .map(|(i, r)| (SlotId::from_index(i), r))
    }

    /// Check that the heap has a root and that every slot reference resolves.
    pub fn validate(&self) -> Result<(), HeapError> {
        if self.records.is_empty() {
            return Err(HeapError::Empty);
        }
        for (slot, record) in self.iter() {
            for target in record.children() {
                if target.index() >= self.records.len() {
                    return Err(HeapError::DanglingReference {
                        slot,
                        target,
                        len: self.records.len(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Record counts per tag.
    pub fn summary(&self) -> TagCounts {
        let mut counts = [0usize; Tag::ALL.len()];
        for record in &self.records {
            let tag = record.tag();
            if let Some(i) = Tag::ALL.iter().position(|&t| t == tag) {
                counts[i] += 1;
            }
        }
        TagCounts { counts }
    }
}

impl fmt::Debug for Heap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(slot, r)| (slot.raw(), r)))
            .finish()
    }
}

impl FromIterator<Record> for Heap {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Heap {
            records: iter.into_iter().collect(),
        }
    }
}

/// Per-tag record counts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagCounts {
    counts: [usize; Tag::ALL.len()],
}

impl TagCounts {
    pub fn get(&self, tag: Tag) -> usize {
        Tag::ALL
            .iter()
            .position(|&t| t == tag)
            .map_or(0, |i| self.counts[i])
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Tags with at least one record, in tag order.
    pub fn iter(&self) -> impl Iterator<Item = (Tag, usize)> + '_ {
        Tag::ALL
            .into_iter()
            .zip(self.counts)
            .filter(|&(_, n)| n > 0)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
