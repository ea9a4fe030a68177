//! Command implementations.
//!
//! Shared helpers for loading input live here in the module root.

mod check;
mod inspect;
mod pack;
mod render;

pub use check::check;
pub use inspect::{inspect, stats};
pub use pack::{pack, value_from_json, PackError};
pub use render::render;

use preserve_heap::{Heap, HeapError};
use preserve_value::Realm;

/// Which realm decoding commands run against.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum RealmChoice {
    /// Every well-known constructor plus the XML DOM codec.
    #[default]
    Standard,
    /// Containers and base kinds only; previews fallback behavior.
    Bare,
}

impl RealmChoice {
    /// Parse the value of `--realm=`.
    pub fn from_flag(value: &str) -> Option<Self> {
        match value {
            "standard" => Some(RealmChoice::Standard),
            "bare" => Some(RealmChoice::Bare),
            _ => None,
        }
    }

    pub fn realm(self) -> Realm {
        match self {
            RealmChoice::Standard => Realm::standard(),
            RealmChoice::Bare => Realm::minimal(),
        }
    }
}

/// Read a file, or exit with a message naming what went wrong.
pub fn read_file(path: &str) -> String {
    match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            let msg = match e.kind() {
                std::io::ErrorKind::NotFound => format!("cannot find file '{path}'"),
                std::io::ErrorKind::PermissionDenied => {
                    format!("permission denied reading '{path}'")
                }
                std::io::ErrorKind::InvalidData => {
                    format!("'{path}' contains invalid UTF-8 data")
                }
                _ => format!("error reading '{path}': {e}"),
            };
            eprintln!("error: {msg}");
            std::process::exit(1);
        }
    }
}

/// Read and parse a heap file, or exit with the parse error.
pub fn load_heap(path: &str) -> Heap {
    match parse_heap(&read_file(path)) {
        Ok(heap) => heap,
        Err(e) => {
            eprintln!("error: {path}: {e}");
            std::process::exit(1);
        }
    }
}

pub fn parse_heap(text: &str) -> Result<Heap, HeapError> {
    Heap::from_json(text)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
