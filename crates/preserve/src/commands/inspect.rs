//! The `inspect` and `stats` commands.

use std::fmt::Write;

use preserve_heap::Heap;

/// One line per record: slot, tag, payload summary.
pub fn inspect(heap: &Heap) -> String {
    let width = heap.len().saturating_sub(1).to_string().len() + 1;
    let mut out = String::new();
    for (slot, record) in heap.iter() {
        let slot = slot.to_string();
        let payload = record.to_string();
        let line = format!("{slot:>width$}  {:<14} {payload}", record.tag().name());
        let _ = writeln!(out, "{}", line.trim_end());
    }
    out
}

/// Record counts per tag, most common first.
pub fn stats(heap: &Heap) -> String {
    let summary = heap.summary();
    let mut counts: Vec<_> = summary.iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut out = String::new();
    for (tag, count) in counts {
        let _ = writeln!(out, "{:<14} {count}", tag.name());
    }
    let _ = writeln!(out, "{:<14} {}", "total", summary.total());
    out
}
