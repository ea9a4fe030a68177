//! Heap tooling behind the `preserve` binary.
//!
//! Each command renders its report to a `String` so the binary only has to
//! read input, print, and pick an exit status.

pub mod commands;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install a hierarchical stderr subscriber when `RUST_LOG` is set.
///
/// Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{prelude::*, EnvFilter};
        use tracing_tree::HierarchicalLayer;

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(
                    HierarchicalLayer::new(2)
                        .with_targets(true)
                        .with_writer(std::io::stderr),
                )
                .with(filter)
                .init();
        }
    });
}
