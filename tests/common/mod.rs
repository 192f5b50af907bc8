//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::time::Duration;

use taglight::{BufferSurface, HighlightEngine, PollOutcome, TagDefinition, TagSet};

/// Build a tag set from (name, patterns) pairs with default styling
pub fn tag_set(tags: &[(&str, &[&str])]) -> TagSet {
    TagSet {
        tags: tags
            .iter()
            .map(|(name, patterns)| TagDefinition {
                name: name.to_string(),
                patterns: patterns.iter().map(|p| p.to_string()).collect(),
                text_color: "#ffffff".to_string(),
                background: None,
            })
            .collect(),
    }
}

/// Poll at a short interval until the engine goes idle (bounded)
pub fn poll_until_settled(engine: &mut HighlightEngine, surface: &mut BufferSurface) {
    for _ in 0..2000 {
        match engine.poll(surface) {
            PollOutcome::Pending => std::thread::sleep(Duration::from_millis(1)),
            PollOutcome::Applied | PollOutcome::Idle => return,
        }
    }
    panic!("engine never settled");
}
