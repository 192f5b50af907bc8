//! Tag definition documents
//!
//! A tag is a named category of text region with one or more regex
//! patterns and an associated style. Definitions arrive as an ordered
//! document, either built in memory or parsed from JSON/YAML:
//!
//! ```json
//! {
//!   "tags": [
//!     {"name": "number", "patterns": ["\\d+"], "text_color": "#b5cea8"}
//!   ]
//! }
//! ```
//!
//! Order matters: tags are scanned and applied in declaration order,
//! so a later tag wins visually where regions overlap.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::registry::ConfigError;

/// Default foreground when a tag omits `text_color`
fn default_text_color() -> String {
    "#ffffff".to_string()
}

/// One named pattern group with its styling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagDefinition {
    /// Unique tag name (e.g. "keyword", "number")
    pub name: String,
    /// Regex sources, matched in declaration order
    pub patterns: Vec<String>,
    /// Foreground color as "#RRGGBB" or "#RRGGBBAA"
    #[serde(default = "default_text_color")]
    pub text_color: String,
    /// Optional background color
    #[serde(default)]
    pub background: Option<String>,
}

/// An ordered collection of tag definitions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TagSet {
    pub tags: Vec<TagDefinition>,
}

impl TagSet {
    /// Parse a JSON tags document
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Parse a YAML tags document
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load a tags document from disk, dispatching on file extension
    ///
    /// `.yaml`/`.yml` parse as YAML, everything else as JSON.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );

        if is_yaml {
            Self::from_yaml_str(&content)
        } else {
            Self::from_json_str(&content)
        }
    }
}

/// RGBA color (0-255 per channel)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Create a new color from RGB values (alpha defaults to 255)
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse from "#RRGGBB" or "#RRGGBBAA" hex string
    pub fn from_hex(s: &str) -> Result<Self, String> {
        let s = s.trim_start_matches('#');
        // Length is in bytes; a multibyte char would make the fixed
        // slices below panic at a char boundary
        if !s.is_ascii() {
            return Err(format!("Invalid color format: {}", s));
        }
        match s.len() {
            6 => Ok(Color {
                r: u8::from_str_radix(&s[0..2], 16).map_err(|e| e.to_string())?,
                g: u8::from_str_radix(&s[2..4], 16).map_err(|e| e.to_string())?,
                b: u8::from_str_radix(&s[4..6], 16).map_err(|e| e.to_string())?,
                a: 255,
            }),
            8 => Ok(Color {
                r: u8::from_str_radix(&s[0..2], 16).map_err(|e| e.to_string())?,
                g: u8::from_str_radix(&s[2..4], 16).map_err(|e| e.to_string())?,
                b: u8::from_str_radix(&s[4..6], 16).map_err(|e| e.to_string())?,
                a: u8::from_str_radix(&s[6..8], 16).map_err(|e| e.to_string())?,
            }),
            _ => Err(format!("Invalid color format: {}", s)),
        }
    }
}

/// Resolved styling for one tag (colors parsed, ready for the host)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagStyle {
    pub foreground: Color,
    pub background: Option<Color>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_tags_dict() {
        let set = TagSet::from_json_str(
            r##"{"tags": [
                {"name": "number", "patterns": ["\\d+"], "text_color": "#b5cea8"},
                {"name": "word", "patterns": ["\\w+"]}
            ]}"##,
        )
        .unwrap();

        assert_eq!(set.tags.len(), 2);
        assert_eq!(set.tags[0].name, "number");
        assert_eq!(set.tags[0].patterns, vec!["\\d+"]);
        // Omitted text_color falls back to white
        assert_eq!(set.tags[1].text_color, "#ffffff");
        assert!(set.tags[1].background.is_none());
    }

    #[test]
    fn test_parse_yaml_tags_document() {
        let set = TagSet::from_yaml_str(
            r##"
tags:
  - name: comment
    patterns:
      - "#.*$"
    text_color: "#6a9955"
    background: "#1e1e1e"
"##,
        )
        .unwrap();

        assert_eq!(set.tags.len(), 1);
        assert_eq!(set.tags[0].name, "comment");
        assert_eq!(set.tags[0].background.as_deref(), Some("#1e1e1e"));
    }

    #[test]
    fn test_parse_malformed_json_fails() {
        let err = TagSet::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_from_file_dispatches_on_extension() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("tags.json");
        let mut f = std::fs::File::create(&json_path).unwrap();
        write!(f, r#"{{"tags": [{{"name": "a", "patterns": ["x"]}}]}}"#).unwrap();
        assert_eq!(TagSet::from_file(&json_path).unwrap().tags.len(), 1);

        let yaml_path = dir.path().join("tags.yaml");
        let mut f = std::fs::File::create(&yaml_path).unwrap();
        write!(f, "tags:\n  - name: a\n    patterns: [x]\n").unwrap();
        assert_eq!(TagSet::from_file(&yaml_path).unwrap().tags.len(), 1);
    }

    #[test]
    fn test_from_file_missing_is_io_error() {
        let err = TagSet::from_file(Path::new("/nonexistent/tags.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_color_from_hex() {
        let c = Color::from_hex("#b5cea8").unwrap();
        assert_eq!(c, Color::rgb(0xb5, 0xce, 0xa8));

        let c = Color::from_hex("11223344").unwrap();
        assert_eq!(c.a, 0x44);

        assert!(Color::from_hex("#fff").is_err());
        assert!(Color::from_hex("#zzzzzz").is_err());
    }

    #[test]
    fn test_color_from_hex_rejects_non_ascii() {
        // 6 bytes but a char straddles the 0..2 slice boundary;
        // must come back as Err, not a slicing panic
        assert!(Color::from_hex("aéabc").is_err());
        assert!(Color::from_hex("#ééé").is_err());
        assert!(Color::from_hex("ffffff\u{301}").is_err());
    }
}
