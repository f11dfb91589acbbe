//! # Configuration
//!
//! Defaults for search depth, notation detection and grid layout, optionally
//! loaded from a YAML file:
//!
//! ```yaml
//! depth: 2
//! notation: auto
//! beats-per-bar: 3
//! max-subdivisions: 4
//! pad-with-last-chord: true
//! ```
//!
//! Every key is optional; missing keys keep their defaults.

use crate::error::GrammarError;
use crate::grid::GridOptions;
use crate::progression::NotationMode;
use crate::search::DEFAULT_SEARCH_DEPTH;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarConfig {
    pub depth: i64,
    pub notation: NotationMode,
    pub grid: GridOptions,
}

impl Default for GrammarConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_SEARCH_DEPTH,
            notation: NotationMode::default(),
            grid: GridOptions::default(),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawConfig {
    depth: Option<i64>,
    notation: Option<NotationMode>,
    beats_per_bar: Option<usize>,
    max_subdivisions: Option<usize>,
    pad_with_last_chord: Option<bool>,
}

impl GrammarConfig {
    pub fn from_yaml_str(content: &str) -> Result<Self, GrammarError> {
        let raw: RawConfig = if content.trim().is_empty() {
            RawConfig::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| GrammarError::Config(e.to_string()))?
        };
        let defaults = GrammarConfig::default();

        let depth = raw.depth.unwrap_or(defaults.depth);
        if depth < 0 {
            return Err(GrammarError::Config(format!(
                "depth must be non-negative, got {}",
                depth
            )));
        }

        let grid = GridOptions {
            beats_per_bar: positive(raw.beats_per_bar, defaults.grid.beats_per_bar, "beats-per-bar")?,
            max_subdivisions: positive(
                raw.max_subdivisions,
                defaults.grid.max_subdivisions,
                "max-subdivisions",
            )?,
            pad_with_last_chord: raw
                .pad_with_last_chord
                .unwrap_or(defaults.grid.pad_with_last_chord),
        };

        Ok(GrammarConfig {
            depth,
            notation: raw.notation.unwrap_or(defaults.notation),
            grid,
        })
    }

    pub fn load(path: &Path) -> Result<Self, GrammarError> {
        let content = fs::read_to_string(path).map_err(|e| {
            GrammarError::Config(format!("cannot read '{}': {}", path.display(), e))
        })?;
        Self::from_yaml_str(&content)
    }
}

fn positive(value: Option<usize>, default: usize, key: &str) -> Result<usize, GrammarError> {
    match value {
        Some(0) => Err(GrammarError::Config(format!("{} must be positive", key))),
        Some(value) => Ok(value),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = GrammarConfig::default();
        assert_eq!(config.depth, 1);
        assert_eq!(config.notation, NotationMode::Auto);
        assert_eq!(config.grid.beats_per_bar, 4);
        assert_eq!(config.grid.max_subdivisions, 4);
        assert!(config.grid.pad_with_last_chord);
    }

    #[test]
    fn test_partial_yaml() {
        let config = GrammarConfig::from_yaml_str("depth: 3\nbeats-per-bar: 3\nnotation: grid\n")
            .unwrap();
        assert_eq!(config.depth, 3);
        assert_eq!(config.notation, NotationMode::Grid);
        assert_eq!(config.grid.beats_per_bar, 3);
        assert_eq!(config.grid.max_subdivisions, 4);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(GrammarConfig::from_yaml_str("").unwrap(), GrammarConfig::default());
    }

    #[test]
    fn test_invalid_values() {
        for yaml in [
            "depth: -1",
            "beats-per-bar: 0",
            "max-subdivisions: 0",
            "notation: bars",
            "unknown-key: 1",
            "depth: [1",
        ] {
            assert!(
                matches!(GrammarConfig::from_yaml_str(yaml), Err(GrammarError::Config(_))),
                "expected config error for {:?}",
                yaml
            );
        }
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max-subdivisions: 8\npad-with-last-chord: false").unwrap();
        let config = GrammarConfig::load(file.path()).unwrap();
        assert_eq!(config.grid.max_subdivisions, 8);
        assert!(!config.grid.pad_with_last_chord);
        assert!(GrammarConfig::load(Path::new("/nonexistent/steedman.yaml")).is_err());
    }
}
