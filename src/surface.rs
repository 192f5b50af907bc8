//! Host surface boundary
//!
//! The engine never touches the widget directly; it reads a snapshot of
//! the document and writes tag regions back through this trait. Offsets
//! are character counts from document start, and it's the surface's job
//! to translate them into its own addressing scheme (line/column, byte
//! index, whatever it uses internally).
//!
//! The host should call [`HighlightEngine::trigger`] on every document
//! change or keystroke; triggers are safe at arbitrary frequency because
//! the engine coalesces them by superseding in-flight runs.
//!
//! [`HighlightEngine::trigger`]: crate::engine::HighlightEngine::trigger

use std::collections::BTreeMap;

/// What the engine needs from the editable text widget
pub trait TextSurface {
    /// Point-in-time snapshot of the full document text
    fn full_text(&self) -> String;

    /// Remove every region currently associated with `tag`
    fn clear_regions(&mut self, tag: &str);

    /// Associate `[start, end)` (character offsets) with `tag`
    fn apply_region(&mut self, tag: &str, start: usize, end: usize);
}

/// In-memory surface: a plain text buffer plus its tag regions
///
/// Stands in for a real widget in tests and in terminal rendering,
/// where "the surface" is just the buffer we reprint.
#[derive(Debug, Default)]
pub struct BufferSurface {
    text: String,
    regions: BTreeMap<String, Vec<(usize, usize)>>,
}

impl BufferSurface {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            regions: BTreeMap::new(),
        }
    }

    /// Replace the buffer contents (the host should trigger a rescan after)
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Regions currently associated with `tag`, in application order
    pub fn regions(&self, tag: &str) -> &[(usize, usize)] {
        self.regions.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All tags that currently have at least one region
    pub fn tagged(&self) -> impl Iterator<Item = (&str, &[(usize, usize)])> {
        self.regions
            .iter()
            .filter(|(_, regions)| !regions.is_empty())
            .map(|(tag, regions)| (tag.as_str(), regions.as_slice()))
    }
}

impl TextSurface for BufferSurface {
    fn full_text(&self) -> String {
        self.text.clone()
    }

    fn clear_regions(&mut self, tag: &str) {
        self.regions.remove(tag);
    }

    fn apply_region(&mut self, tag: &str, start: usize, end: usize) {
        self.regions.entry(tag.to_string()).or_default().push((start, end));
    }
}
