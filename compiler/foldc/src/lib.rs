//! The fold driver.
//!
//! [`Compilation`] runs the optimizer stages over a [`fold_ir::Program`]:
//!
//! 1. vertical class merging
//! 2. horizontal class merging, initial round
//! 3. member rebinding
//! 4. horizontal class merging, final round
//! 5. verification of the merged maps and the composed lens
//! 6. delivery of global synthetics
//!
//! Per-file compilations only run the horizontal initial round.
//!
//! # Tracing
//!
//! Stages log through `tracing`, each inside its own span. Call
//! [`init_tracing`] once to print them:
//!
//! - `RUST_LOG=fold_merge=debug`: policy decisions and merges
//! - `RUST_LOG=fold_rebind=trace`: every rebinding and planned bridge
//! - `FOLD_LOG_TREE=1`: indent events under their stage spans

mod compilation;
mod error;

use std::sync::Once;

pub use compilation::{Compilation, CompilationOutput};
pub use error::CompileError;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Does nothing unless `RUST_LOG` is set.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_err() {
            return;
        }
        let filter = EnvFilter::from_default_env();
        if std::env::var_os("FOLD_LOG_TREE").is_some() {
            tracing_subscriber::registry()
                .with(
                    tracing_tree::HierarchicalLayer::new(2)
                        .with_targets(true)
                        .with_indent_lines(true),
                )
                .with(filter)
                .init();
        } else {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
