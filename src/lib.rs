//! taglight - non-blocking syntax highlighting for editable text surfaces
//!
//! Named pattern groups (tags) are matched against the full document on
//! a background thread and handed back to the host surface as colored
//! spans, so typing never stalls on a rescan. Every edit supersedes the
//! scan in flight; stale results are filtered when they are consumed,
//! not prevented from being produced.
//!
//! ```no_run
//! use taglight::{BufferSurface, HighlightEngine, PollOutcome, TagSet};
//!
//! let tags = TagSet::from_json_str(
//!     r#"{"tags": [{"name": "number", "patterns": ["\\d+"]}]}"#,
//! )?;
//! let mut engine = HighlightEngine::new(&tags)?;
//! let mut surface = BufferSurface::new("a1 b22");
//!
//! engine.trigger(&surface);
//! while engine.poll(&mut surface) == PollOutcome::Pending {
//!     std::thread::sleep(std::time::Duration::from_millis(2));
//! }
//! assert_eq!(surface.regions("number"), &[(1, 2), (4, 6)]);
//! # Ok::<(), taglight::ConfigError>(())
//! ```

pub mod engine;
pub mod registry;
pub mod scanner;
pub mod span;
pub mod surface;
pub mod tags;

// Re-export commonly used types
pub use engine::{HighlightEngine, PollOutcome};
pub use registry::{CompiledPatternSet, ConfigError, PatternRegistry};
pub use span::{ScanOutcome, ScanResult, Span};
pub use surface::{BufferSurface, TextSurface};
pub use tags::{Color, TagDefinition, TagSet, TagStyle};
