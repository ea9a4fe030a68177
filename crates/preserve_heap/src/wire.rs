//! JSON wire format.
//!
//! Each record is `{"type": <tag name>, "value": <payload>}`. Output is an
//! object keyed by decimal slot id; input may also be a plain sequence.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Deserialize, Serialize, Serializer};

use crate::number::WireNumber;
use crate::record::SetEntry;
use crate::{Heap, HeapError, Record, SlotId, Tag};

/// Payload written for `undefined`, `null`, `nan` and `neg0`.
const SENTINEL: &str = "";

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut record = serializer.serialize_struct("Record", 2)?;
        record.serialize_field("type", self.tag().name())?;
        match self {
            Record::Undefined | Record::Null | Record::Nan | Record::NegZero => {
                record.serialize_field("value", SENTINEL)?;
            }
            Record::Boolean(b) => record.serialize_field("value", b)?,
            Record::Number(n) | Record::Date(n) => {
                record.serialize_field("value", &WireNumber(*n))?;
            }
            Record::String(s) | Record::BigInt(s) | Record::DomNode(s) => {
                record.serialize_field("value", s)?;
            }
            Record::Infinity(sign) => record.serialize_field("value", sign)?,
            // A symbol without a description prints as `Symbol()`.
            Record::Symbol(desc) => {
                record.serialize_field("value", desc.as_deref().unwrap_or_default())?;
            }
            Record::RegExp(re) => record.serialize_field("value", re)?,
            Record::Error(err) => record.serialize_field("value", err)?,
            Record::ArrayBuffer(bytes) => record.serialize_field("value", bytes)?,
            Record::TypedArray(view) => record.serialize_field("value", view)?,
            Record::Function(func) => record.serialize_field("value", func)?,
            Record::Array(items) | Record::NodeList(items) | Record::HtmlCollection(items) => {
                record.serialize_field("value", items)?;
            }
            Record::Object(entries) | Record::Map(entries) => {
                record.serialize_field("value", entries)?;
            }
            Record::Set(items) => {
                let entries: Vec<SetEntry> =
                    items.iter().map(|&value| SetEntry { value }).collect();
                record.serialize_field("value", &entries)?;
            }
        }
        record.end()
    }
}

impl Serialize for Heap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (slot, record) in self.iter() {
            map.serialize_entry(&slot.raw().to_string(), record)?;
        }
        map.end()
    }
}

/// A record before its tag is checked.
#[derive(Deserialize)]
struct RawRecord {
    #[serde(rename = "type")]
    tag: String,
    #[serde(default)]
    value: serde_json::Value,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawHeap {
    Keyed(BTreeMap<String, RawRecord>),
    Sequence(Vec<RawRecord>),
}

impl Heap {
    /// Parse the wire form.
    pub fn from_json(text: &str) -> Result<Heap, HeapError> {
        let raw: RawHeap = serde_json::from_str(text)?;
        Self::from_raw(raw)
    }

    pub fn to_json(&self) -> Result<String, HeapError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, HeapError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_json_value(&self) -> Result<serde_json::Value, HeapError> {
        Ok(serde_json::to_value(self)?)
    }

    fn from_raw(raw: RawHeap) -> Result<Heap, HeapError> {
        let raw_records = match raw {
            RawHeap::Sequence(records) => records,
            RawHeap::Keyed(keyed) => ordered_by_slot(keyed)?,
        };
        let mut heap = Heap::with_capacity(raw_records.len());
        for (index, raw) in raw_records.into_iter().enumerate() {
            let record = decode_record(SlotId::from_index(index), raw)?;
            heap.push(record);
        }
        Ok(heap)
    }
}

/// Order keyed records by slot id, rejecting gaps and non-numeric keys.
fn ordered_by_slot(keyed: BTreeMap<String, RawRecord>) -> Result<Vec<RawRecord>, HeapError> {
    let mut by_slot = BTreeMap::new();
    for (key, record) in keyed {
        let Ok(raw) = key.parse::<u32>() else {
            return Err(HeapError::InvalidSlotKey { key });
        };
        // "01" and "1" name the same slot in a script object, but not here.
        if raw.to_string() != key {
            return Err(HeapError::InvalidSlotKey { key });
        }
        by_slot.insert(raw, record);
    }
    let mut records = Vec::with_capacity(by_slot.len());
    for (expected, (raw, record)) in by_slot.into_iter().enumerate() {
        let expected = SlotId::from_index(expected);
        if raw != expected.raw() {
            return Err(HeapError::MissingSlot { slot: expected });
        }
        records.push(record);
    }
    Ok(records)
}

fn payload<T: DeserializeOwned>(
    slot: SlotId,
    tag: Tag,
    value: serde_json::Value,
) -> Result<T, HeapError> {
    serde_json::from_value(value).map_err(|source| HeapError::MalformedPayload { slot, tag, source })
}

fn decode_record(slot: SlotId, raw: RawRecord) -> Result<Record, HeapError> {
    let Some(tag) = Tag::from_name(&raw.tag) else {
        return Err(HeapError::UnreachableTag { slot, tag: raw.tag });
    };
    let value = raw.value;
    Ok(match tag {
        Tag::Undefined => Record::Undefined,
        Tag::Null => Record::Null,
        Tag::Nan => Record::Nan,
        Tag::NegZero => Record::NegZero,
        Tag::Boolean => Record::Boolean(payload(slot, tag, value)?),
        Tag::Number => Record::Number(payload(slot, tag, value)?),
        Tag::String => Record::String(payload(slot, tag, value)?),
        Tag::Infinity => Record::Infinity(payload(slot, tag, value)?),
        Tag::BigInt => Record::BigInt(payload(slot, tag, value)?),
        Tag::Symbol => Record::Symbol(payload(slot, tag, value)?),
        Tag::Date => Record::Date(payload::<WireNumber>(slot, tag, value)?.0),
        Tag::RegExp => Record::RegExp(payload(slot, tag, value)?),
        Tag::Error => Record::Error(payload(slot, tag, value)?),
        Tag::ArrayBuffer => Record::ArrayBuffer(payload(slot, tag, value)?),
        Tag::TypedArray => Record::TypedArray(payload(slot, tag, value)?),
        Tag::Function => Record::Function(payload(slot, tag, value)?),
        Tag::DomNode => Record::DomNode(payload(slot, tag, value)?),
        Tag::Array => Record::Array(payload(slot, tag, value)?),
        Tag::Object => Record::Object(payload(slot, tag, value)?),
        Tag::Map => Record::Map(payload(slot, tag, value)?),
        Tag::Set => {
            let entries: Vec<SetEntry> = payload(slot, tag, value)?;
            Record::Set(entries.into_iter().map(|e| e.value).collect())
        }
        Tag::NodeList => Record::NodeList(payload(slot, tag, value)?),
        Tag::HtmlCollection => Record::HtmlCollection(payload(slot, tag, value)?),
    })
}
