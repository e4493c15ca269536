//! Tracing setup for the editor.
//!
//! Scene edits, uploads and texture loads log at `debug`; the per-draw
//! `trace!` output of the render traversal stays hidden unless asked for.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Filter used when neither [`LOG_ENV`] nor `RUST_LOG` is set.
pub const DEFAULT_FILTER: &str =
    "info,editor_scene=debug,editor_resources=debug,editor_renderer=debug";

/// Environment variable consulted before `RUST_LOG`.
pub const LOG_ENV: &str = "EDITOR_LOG";

fn editor_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global subscriber.
///
/// Output goes to stderr with targets and thread ids, the latter telling
/// texture decoding workers apart from the render tick. Calling it more than
/// once is harmless; later calls are ignored.
///
/// # Example
/// ```
/// editor_core::init_logging();
/// tracing::info!("Editor initialized");
/// ```
pub fn init_logging() {
    let _ = tracing_subscriber::registry()
        .with(editor_filter())
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(true),
        )
        .try_init();
}
