//! Scan output data structures
//!
//! Defines the spans produced by a scan and the per-run outcome type.

/// A single matched region of text attributed to a tag.
///
/// Offsets are character counts from the start of the document,
/// 0-based and end-exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    /// Name of the tag this region belongs to
    pub tag: String,
    /// Start offset (inclusive)
    pub start: usize,
    /// End offset (exclusive)
    pub end: usize,
}

impl Span {
    pub fn new(tag: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            tag: tag.into(),
            start,
            end,
        }
    }
}

/// All spans produced by one scan, in tag-registration order,
/// then pattern order, then match order. Not sorted by offset.
pub type ScanResult = Vec<Span>;

/// Outcome of one scanner run.
///
/// `Completed(vec![])` means the scan ran to the end and legitimately
/// found nothing; `Failed` means the run aborted partway. An empty span
/// list is never used to signal a fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The scan ran to completion, producing these spans
    Completed(ScanResult),
    /// The run observed its cancellation flag and stopped early
    Cancelled,
    /// The run aborted with an unexpected fault (nothing is applied)
    Failed(String),
}
