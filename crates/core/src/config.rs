use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Keyword set '{0}' is empty")]
    EmptyKeywords(&'static str),
    #[error("Match threshold must be within 0..=100, got {0}")]
    InvalidThreshold(f64),
    #[error("Confidence '{name}' must be within 0.0..=1.0, got {value}")]
    InvalidConfidence { name: &'static str, value: f64 },
}

pub const DEFAULT_INCOME_KEYWORDS: &[&str] = &[
    "rent",
    "revenue",
    "income",
    "receipts",
    "fees",
    "charges",
    "tenant",
    "resident",
    "rental",
    "lease",
    "concessions",
    "short term",
    "airbnb",
    "vrbo",
    "parking",
    "pet fees",
    "application",
    "admin",
    "late fees",
    "utility recovery",
];

pub const DEFAULT_EXPENSE_KEYWORDS: &[&str] = &[
    "expense",
    "cost",
    "maintenance",
    "repair",
    "utilities",
    "insurance",
    "tax",
    "management",
    "legal",
    "accounting",
    "marketing",
    "advertising",
    "cleaning",
    "landscaping",
    "security",
    "supplies",
    "equipment",
    "capital",
    "depreciation",
    "move out",
    "damages",
    "incentives",
    "specials",
];

pub const DEFAULT_TOTAL_KEYWORDS: &[&str] = &[
    "total income",
    "total expense",
    "net income",
    "gross income",
    "operating income",
    "operating expense",
    "net operating income",
    "total revenue",
    "total costs",
    "profit",
    "loss",
];

/// Keyword sets and scoring constants shared by the scorer and the engine.
///
/// Built once and handed to the engine; nothing mutates it afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategorizerConfig {
    pub income_keywords: Vec<String>,
    pub expense_keywords: Vec<String>,
    pub total_keywords: Vec<String>,
    /// Partial-ratio score (0-100) a keyword set must strictly exceed.
    pub match_threshold: f64,
    /// Upper bound for confidences produced by fuzzy matching.
    pub fuzzy_confidence_cap: f64,
    /// Confidence for total/summary keyword hits.
    pub summary_confidence: f64,
    /// Confidence for rows tagged by section context.
    pub section_confidence: f64,
    /// Confidence for rows carrying a user correction.
    pub correction_confidence: f64,
    /// Confidence for rows nothing could classify.
    pub fallback_confidence: f64,
}

impl Default for CategorizerConfig {
    fn default() -> Self {
        fn owned(words: &[&str]) -> Vec<String> {
            words.iter().map(|w| w.to_string()).collect()
        }

        Self {
            income_keywords: owned(DEFAULT_INCOME_KEYWORDS),
            expense_keywords: owned(DEFAULT_EXPENSE_KEYWORDS),
            total_keywords: owned(DEFAULT_TOTAL_KEYWORDS),
            match_threshold: 60.0,
            fuzzy_confidence_cap: 0.85,
            summary_confidence: 0.9,
            section_confidence: 0.9,
            correction_confidence: 0.95,
            fallback_confidence: 0.3,
        }
    }
}

impl CategorizerConfig {
    pub fn from_toml(toml_content: &str) -> Result<Self, ConfigError> {
        let mut config: CategorizerConfig = toml::from_str(toml_content)?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.income_keywords.is_empty() {
            return Err(ConfigError::EmptyKeywords("income_keywords"));
        }
        if self.expense_keywords.is_empty() {
            return Err(ConfigError::EmptyKeywords("expense_keywords"));
        }
        if self.total_keywords.is_empty() {
            return Err(ConfigError::EmptyKeywords("total_keywords"));
        }
        if !(0.0..=100.0).contains(&self.match_threshold) {
            return Err(ConfigError::InvalidThreshold(self.match_threshold));
        }

        let confidences = [
            ("fuzzy_confidence_cap", self.fuzzy_confidence_cap),
            ("summary_confidence", self.summary_confidence),
            ("section_confidence", self.section_confidence),
            ("correction_confidence", self.correction_confidence),
            ("fallback_confidence", self.fallback_confidence),
        ];
        for (name, value) in confidences {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidConfidence { name, value });
            }
        }

        Ok(())
    }

    /// Lowercases and trims every keyword so matching can compare directly
    /// against a lowercased account name.
    fn normalize(&mut self) {
        for set in [
            &mut self.income_keywords,
            &mut self.expense_keywords,
            &mut self.total_keywords,
        ] {
            for word in set.iter_mut() {
                *word = word.trim().to_lowercase();
            }
            set.retain(|w| !w.is_empty());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = CategorizerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.income_keywords.len(), DEFAULT_INCOME_KEYWORDS.len());
        assert_eq!(config.match_threshold, 60.0);
        assert_eq!(config.correction_confidence, 0.95);
    }

    #[test]
    fn from_toml_fills_missing_fields_with_defaults() {
        let config = CategorizerConfig::from_toml(
            r#"
            expense_keywords = ["Janitorial", "  snow removal "]
            match_threshold = 70
            "#,
        )
        .unwrap();
        assert_eq!(config.expense_keywords, vec!["janitorial", "snow removal"]);
        assert_eq!(config.match_threshold, 70.0);
        assert_eq!(config.income_keywords, CategorizerConfig::default().income_keywords);
        assert_eq!(config.fallback_confidence, 0.3);
    }

    #[test]
    fn from_toml_rejects_empty_keyword_set() {
        let err = CategorizerConfig::from_toml("total_keywords = []").unwrap_err();
        assert!(matches!(err, ConfigError::EmptyKeywords("total_keywords")));
    }

    #[test]
    fn from_toml_rejects_out_of_range_confidence() {
        let err = CategorizerConfig::from_toml("section_confidence = 1.5").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidConfidence { name: "section_confidence", .. }
        ));
    }

    #[test]
    fn from_toml_rejects_bad_threshold() {
        let err = CategorizerConfig::from_toml("match_threshold = 120").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidThreshold(_)));
    }

    #[test]
    fn from_toml_reports_parse_errors() {
        let err = CategorizerConfig::from_toml("income_keywords = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
