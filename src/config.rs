use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::scoring::{classify, ScoringScheme};
use crate::{AlignerError, DEFAULT_GAP_MARKER, DEFAULT_MAX_CELLS};

/// Aligner settings, loadable from TOML:
///
/// ```toml
/// gap_marker = "-"
/// max_cells = 100000000
///
/// [scoring]
/// match_score = 2
/// gap_open = -16
/// ```
///
/// Every field is optional and falls back to the default scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignerConfig {
    pub gap_marker: char,
    /// Upper bound on `(len1 + 1) * (len2 + 1)` per call.
    pub max_cells: usize,
    pub scoring: ScoringScheme,
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self {
            gap_marker: DEFAULT_GAP_MARKER as char,
            max_cells: DEFAULT_MAX_CELLS,
            scoring: ScoringScheme::default(),
        }
    }
}

impl AlignerConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, AlignerError> {
        let config: Self =
            toml::from_str(s).map_err(|e| AlignerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AlignerError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        debug!("loaded aligner config from {}", path.display());
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), AlignerError> {
        self.scoring.validate()?;
        if !self.gap_marker.is_ascii() {
            return Err(AlignerError::Config(format!(
                "gap marker must be a printable ASCII character, got {:?}",
                self.gap_marker
            )));
        }
        validate_gap_marker(self.gap_marker as u8)
            .map_err(|e| AlignerError::Config(e.to_string()))?;
        if self.max_cells == 0 {
            return Err(AlignerError::Config("max_cells must be positive".into()));
        }
        Ok(())
    }

    pub fn to_toml_string(&self) -> Result<String, AlignerError> {
        toml::to_string(self).map_err(|e| AlignerError::Config(e.to_string()))
    }
}

/// A gap marker must be printable ASCII and must not be one of `A C G T`.
pub fn validate_gap_marker(marker: u8) -> Result<(), AlignerError> {
    if !marker.is_ascii_graphic() {
        return Err(AlignerError::InvalidInput(format!(
            "gap marker must be a printable ASCII character, got {:?}",
            marker as char
        )));
    }
    if classify(marker).is_some() {
        return Err(AlignerError::InvalidInput(format!(
            "gap marker '{}' collides with a nucleotide",
            marker as char
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        let config = AlignerConfig::from_toml_str("").unwrap();
        assert_eq!(config, AlignerConfig::default());
    }

    #[test]
    fn partial_scoring_override() {
        let config = AlignerConfig::from_toml_str(
            r#"
            gap_marker = "."

            [scoring]
            gap_open = -10
            "#,
        )
        .unwrap();
        assert_eq!(config.gap_marker, '.');
        assert_eq!(config.scoring.gap_open, -10);
        assert_eq!(config.scoring.match_score, 2);
        assert_eq!(config.scoring.gap_extend, -1);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            AlignerConfig::from_toml_str("[scoring]\nmatch_score = -3"),
            Err(AlignerError::InvalidInput(_))
        ));
        assert!(matches!(
            AlignerConfig::from_toml_str("gap_marker = \"é\""),
            Err(AlignerError::Config(_))
        ));
        assert!(matches!(
            AlignerConfig::from_toml_str("max_cells = 0"),
            Err(AlignerError::Config(_))
        ));
        assert!(matches!(
            AlignerConfig::from_toml_str("gap_marker = \"A\""),
            Err(AlignerError::Config(_))
        ));
        assert!(matches!(
            AlignerConfig::from_toml_str("gap_marker = \" \""),
            Err(AlignerError::Config(_))
        ));
        assert!(matches!(
            AlignerConfig::from_toml_str("gap_marker = 3"),
            Err(AlignerError::Config(_))
        ));
    }

    #[test]
    fn toml_round_trip() {
        let config = AlignerConfig::default();
        let text = config.to_toml_string().unwrap();
        assert_eq!(AlignerConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = AlignerConfig::from_path("/nonexistent/aligner.toml").unwrap_err();
        assert!(matches!(err, AlignerError::Io(_)));
    }
}
