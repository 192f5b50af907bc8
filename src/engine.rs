//! Highlighting coordinator
//!
//! Serializes rescans against an ever-changing document. Each trigger
//! supersedes the previous run and launches a fresh worker thread with a
//! snapshot of the text and the current compiled set; the host drains
//! completed results on its own thread via [`HighlightEngine::poll`].
//!
//! ## Architecture
//!
//! ```text
//! Edit/keystroke → trigger() → supersede prior run → spawn worker
//!               → (worker thread) scan → send (revision, outcome)
//!               → poll() → stale? discard : clear-then-reapply
//! ```
//!
//! Staleness is filtered at consumption, not prevented at production:
//! cancellation of a running scan is best-effort (a cooperative flag
//! checked between match attempts), so a superseded run may still
//! complete, and its result is dropped because its revision no longer
//! matches the engine's.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

use crate::registry::{CompiledPatternSet, ConfigError, PatternRegistry};
use crate::scanner;
use crate::span::{ScanOutcome, ScanResult};
use crate::surface::TextSurface;
use crate::tags::TagSet;

/// One message from a worker back to the engine
#[derive(Debug)]
struct ScanMessage {
    /// Engine revision at the time the run was launched
    revision: u64,
    outcome: ScanOutcome,
}

/// Whether a run is outstanding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    /// No run in flight
    Idle,
    /// Exactly one scan active for this revision
    Running(u64),
}

/// What the host should do after a poll step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// A fresh result was applied to the surface; the engine is idle
    Applied,
    /// The current run hasn't finished; poll again shortly
    Pending,
    /// Nothing outstanding; no need to reschedule the poll
    Idle,
}

/// The highlighting engine
pub struct HighlightEngine {
    registry: PatternRegistry,
    tx: Sender<ScanMessage>,
    rx: Receiver<ScanMessage>,
    /// Revision of the run whose result will be applied; bumped on every
    /// trigger, which supersedes whatever was in flight
    revision: u64,
    state: RunState,
    /// Cancel flag of the current run, if any
    cancel: Option<Arc<AtomicBool>>,
}

impl HighlightEngine {
    /// Create an engine from an initial tag set
    pub fn new(definitions: &TagSet) -> Result<Self, ConfigError> {
        let (tx, rx) = mpsc::channel();
        Ok(Self {
            registry: PatternRegistry::new(definitions)?,
            tx,
            rx,
            revision: 0,
            state: RunState::Idle,
            cancel: None,
        })
    }

    /// Names of the currently registered tags, in registration order
    pub fn tag_names(&self) -> Vec<String> {
        self.registry.tag_names()
    }

    /// Access the registry (e.g. to read compiled tag styles)
    pub fn registry(&self) -> &PatternRegistry {
        &self.registry
    }

    /// True while a run is outstanding and the host should keep polling
    pub fn is_running(&self) -> bool {
        matches!(self.state, RunState::Running(_))
    }

    /// Request a rescan. Call on every document change or keystroke.
    ///
    /// Supersedes any run still in flight: its cancel flag is set
    /// (best-effort) and its eventual result, if it completes anyway,
    /// will be discarded by [`poll`](Self::poll).
    pub fn trigger<S: TextSurface>(&mut self, surface: &S) {
        self.start_run(surface.full_text());
    }

    fn start_run(&mut self, snapshot: String) {
        let bytes = snapshot.len();
        self.spawn_worker(move |patterns, cancel| {
            scanner::scan_cancellable(&snapshot, patterns, cancel)
        });
        tracing::debug!(
            "Started scan for revision {} ({} bytes)",
            self.revision,
            bytes
        );
    }

    /// Supersede the current run and launch `job` on a fresh worker
    /// thread. Panics inside the job are caught and reported as
    /// [`ScanOutcome::Failed`].
    fn spawn_worker<F>(&mut self, job: F)
    where
        F: FnOnce(&CompiledPatternSet, &AtomicBool) -> Option<ScanResult> + Send + 'static,
    {
        if let RunState::Running(revision) = self.state {
            tracing::debug!("Superseding in-flight scan for revision {}", revision);
        }
        if let Some(flag) = self.cancel.take() {
            flag.store(true, Ordering::Relaxed);
        }

        self.revision += 1;
        let revision = self.revision;
        let cancel = Arc::new(AtomicBool::new(false));
        self.cancel = Some(Arc::clone(&cancel));

        // The run captures its own reference to the compiled set; a
        // reload mid-scan swaps the registry's Arc without touching it.
        let patterns = self.registry.patterns();
        let tx = self.tx.clone();

        std::thread::spawn(move || {
            let outcome =
                match std::panic::catch_unwind(AssertUnwindSafe(|| job(&patterns, &cancel))) {
                    Ok(Some(spans)) => ScanOutcome::Completed(spans),
                    Ok(None) => ScanOutcome::Cancelled,
                    Err(panic) => {
                        let message = panic
                            .downcast_ref::<&str>()
                            .map(|s| s.to_string())
                            .or_else(|| panic.downcast_ref::<String>().cloned())
                            .unwrap_or_else(|| "unknown panic".to_string());
                        ScanOutcome::Failed(message)
                    }
                };
            // Engine gone means nothing cares about this result anymore
            let _ = tx.send(ScanMessage { revision, outcome });
        });

        self.state = RunState::Running(revision);
    }

    /// Drain completed results, applying at most the current revision's.
    ///
    /// Non-blocking; call repeatedly at a short interval while it
    /// returns [`PollOutcome::Pending`]. Results from superseded runs
    /// are discarded here regardless of whether their cancellation ever
    /// took effect.
    pub fn poll<S: TextSurface>(&mut self, surface: &mut S) -> PollOutcome {
        let mut applied = false;

        while let Ok(ScanMessage { revision, outcome }) = self.rx.try_recv() {
            if revision != self.revision {
                tracing::debug!(
                    "Discarding stale scan result: engine revision {} != result revision {}",
                    self.revision,
                    revision
                );
                continue;
            }

            match outcome {
                ScanOutcome::Completed(spans) => {
                    self.apply(surface, &spans);
                    tracing::debug!("Applied {} spans for revision {}", spans.len(), revision);
                    applied = true;
                }
                ScanOutcome::Cancelled => {
                    // Only superseded runs are cancelled, and those fail
                    // the revision check above; a current-revision
                    // cancellation means nothing will be applied.
                    tracing::debug!("Current scan reported cancelled, nothing applied");
                }
                ScanOutcome::Failed(reason) => {
                    // ScanFault: treated as absent, the next edit's
                    // trigger retries naturally.
                    tracing::warn!("Scan for revision {} failed: {}", revision, reason);
                }
            }

            self.state = RunState::Idle;
            self.cancel = None;
        }

        match self.state {
            RunState::Running(_) => PollOutcome::Pending,
            RunState::Idle if applied => PollOutcome::Applied,
            RunState::Idle => PollOutcome::Idle,
        }
    }

    /// Replace the active tag definitions and rescan.
    ///
    /// All-or-nothing: on a compile error the previous set stays active
    /// and the surface is untouched. On success every previously known
    /// tag's regions are cleared before the rescan is triggered.
    pub fn reload<S: TextSurface>(
        &mut self,
        surface: &mut S,
        definitions: &TagSet,
    ) -> Result<(), ConfigError> {
        let old_names = self.registry.tag_names();
        self.registry.load(definitions)?;

        for name in &old_names {
            surface.clear_regions(name);
        }

        self.start_run(surface.full_text());
        Ok(())
    }

    /// Clear-then-reapply: replace all regions for every known tag
    fn apply<S: TextSurface>(&self, surface: &mut S, spans: &ScanResult) {
        for name in self.registry.tag_names() {
            surface.clear_regions(&name);
        }
        for span in spans {
            surface.apply_region(&span.tag, span.start, span.end);
        }
    }
}
