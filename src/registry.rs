//! Pattern registry
//!
//! Compiles tag definitions into an immutable [`CompiledPatternSet`] and
//! swaps it atomically on reload. The compiled set is shared with
//! in-flight scans through an `Arc`: a reload never mutates the set a
//! running scan captured at launch, it just replaces the registry's
//! reference (copy-on-replace).

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use regex::{Regex, RegexBuilder};
use thiserror::Error;

use crate::tags::{Color, TagSet, TagStyle};

/// Errors raised while loading tag definitions
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read tag file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse tag definitions: {0}")]
    Parse(String),

    #[error("duplicate tag name: {0}")]
    DuplicateTag(String),

    #[error("invalid pattern {pattern:?} for tag {tag}: {source}")]
    Pattern {
        tag: String,
        pattern: String,
        source: regex::Error,
    },

    #[error("invalid color {value:?} for tag {tag}: {message}")]
    Color {
        tag: String,
        value: String,
        message: String,
    },
}

/// One compiled tag: its name, patterns in declaration order, and style
#[derive(Debug, Clone)]
pub struct CompiledTag {
    pub name: String,
    pub patterns: Vec<Regex>,
    pub style: TagStyle,
}

/// An ordered, immutable set of compiled tags
///
/// Never mutated after construction; rebuilt in full on every reload.
#[derive(Debug, Default)]
pub struct CompiledPatternSet {
    tags: Vec<CompiledTag>,
}

impl CompiledPatternSet {
    /// Compile a tag set, validating patterns, names and colors.
    ///
    /// Patterns compile with multiline semantics so `^` and `$` match at
    /// line boundaries within the whole document.
    pub fn compile(definitions: &TagSet) -> Result<Self, ConfigError> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut tags = Vec::with_capacity(definitions.tags.len());

        for def in &definitions.tags {
            if !seen.insert(def.name.as_str()) {
                return Err(ConfigError::DuplicateTag(def.name.clone()));
            }

            let mut patterns = Vec::with_capacity(def.patterns.len());
            for source in &def.patterns {
                let regex = RegexBuilder::new(source)
                    .multi_line(true)
                    .build()
                    .map_err(|e| ConfigError::Pattern {
                        tag: def.name.clone(),
                        pattern: source.clone(),
                        source: e,
                    })?;
                patterns.push(regex);
            }

            let foreground =
                Color::from_hex(&def.text_color).map_err(|message| ConfigError::Color {
                    tag: def.name.clone(),
                    value: def.text_color.clone(),
                    message,
                })?;
            let background = match &def.background {
                Some(value) => {
                    Some(
                        Color::from_hex(value).map_err(|message| ConfigError::Color {
                            tag: def.name.clone(),
                            value: value.clone(),
                            message,
                        })?,
                    )
                }
                None => None,
            };

            tags.push(CompiledTag {
                name: def.name.clone(),
                patterns,
                style: TagStyle {
                    foreground,
                    background,
                },
            });
        }

        Ok(Self { tags })
    }

    /// Compiled tags in registration order
    pub fn tags(&self) -> &[CompiledTag] {
        &self.tags
    }

    /// Tag names in registration order
    pub fn tag_names(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(|t| t.name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

/// Holds the currently active compiled set
///
/// `load` is all-or-nothing: the incoming definitions compile completely
/// before the active set is replaced, so a failed reload leaves the
/// previous valid set in place.
#[derive(Debug, Default)]
pub struct PatternRegistry {
    current: Arc<CompiledPatternSet>,
}

impl PatternRegistry {
    /// Create a registry from an initial tag set
    pub fn new(definitions: &TagSet) -> Result<Self, ConfigError> {
        Ok(Self {
            current: Arc::new(CompiledPatternSet::compile(definitions)?),
        })
    }

    /// Replace the active set with freshly compiled definitions
    pub fn load(&mut self, definitions: &TagSet) -> Result<(), ConfigError> {
        let compiled = CompiledPatternSet::compile(definitions)?;
        self.current = Arc::new(compiled);
        tracing::info!(
            "Loaded {} tag definitions into registry",
            self.current.tags().len()
        );
        Ok(())
    }

    /// The active compiled set; clones of this `Arc` are captured by
    /// in-flight scans and stay stable across reloads
    pub fn patterns(&self) -> Arc<CompiledPatternSet> {
        Arc::clone(&self.current)
    }

    /// Names of the currently registered tags
    pub fn tag_names(&self) -> Vec<String> {
        self.current.tag_names().map(str::to_string).collect()
    }
}
