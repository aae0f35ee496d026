use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use stmtcat_core::{account_name, CategorizedRow, CategorizerConfig, Category, LearningRecord, Row, Summary};
use stmtcat_storage::{LearningStore, StorageError};

use crate::fuzzy::FuzzyScorer;
use crate::section::SectionDetector;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorizationResult {
    pub categorized_data: Vec<CategorizedRow>,
    pub summary: Summary,
}

/// Which strategy settled a row's category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    Section,
    Correction,
    Learned,
    Fuzzy,
}

/// Orchestrates section context, learned history and fuzzy scoring, and
/// records every outcome back into the learning store.
pub struct CategorizationEngine<S: LearningStore> {
    store: S,
    config: Arc<CategorizerConfig>,
    detector: SectionDetector,
    scorer: FuzzyScorer,
}

impl<S: LearningStore> CategorizationEngine<S> {
    pub fn new(store: S, config: CategorizerConfig) -> Self {
        let config = Arc::new(config);
        Self {
            store,
            scorer: FuzzyScorer::new(config.clone()),
            detector: SectionDetector::new(),
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &CategorizerConfig {
        &self.config
    }

    /// Categorizes `rows` in order. Rows without a usable account name are
    /// dropped from the output; the rest come back with `ai_category` and
    /// `confidence_score` attached.
    pub async fn categorize(
        &self,
        rows: &[Row],
        file_type: &str,
    ) -> Result<CategorizationResult, EngineError> {
        tracing::info!("Categorizing {} rows for file type: {}", rows.len(), file_type);

        let sections = self.detector.detect(rows);
        let mut categorized_data = Vec::with_capacity(rows.len());

        for row in rows {
            let Some(name) = account_name(row) else {
                continue;
            };
            if name.trim().is_empty() {
                continue;
            }

            let (category, confidence, resolution) =
                self.resolve(name, file_type, &sections).await?;
            let confidence = confidence.clamp(0.0, 1.0);
            tracing::debug!(
                "{name:?} -> {category} ({confidence:.2}) via {resolution:?}"
            );

            self.store
                .save(name, file_type, category, confidence, None)
                .await?;

            categorized_data.push(CategorizedRow::new(row, category, confidence));
        }

        let summary = Summary::from_rows(&categorized_data);
        tracing::info!(
            "Categorization complete: {} records ({} income, {} expense, {} net income, {} uncategorized), avg confidence {:.2}",
            summary.total_records,
            summary.income_count,
            summary.expense_count,
            summary.net_income_count,
            summary.uncategorized_count,
            summary.confidence_avg
        );

        Ok(CategorizationResult {
            categorized_data,
            summary,
        })
    }

    async fn resolve(
        &self,
        name: &str,
        file_type: &str,
        sections: &HashMap<String, Category>,
    ) -> Result<(Category, f64, Resolution), EngineError> {
        if let Some(&category) = sections.get(name) {
            return Ok((category, self.config.section_confidence, Resolution::Section));
        }

        // Looked up per row so earlier rows of this batch are already visible.
        if let Some(record) = self.store.find(name, file_type).await? {
            return Ok(match record.user_corrected_category {
                Some(corrected) => (
                    corrected,
                    self.config.correction_confidence,
                    Resolution::Correction,
                ),
                None => (
                    record.predicted_category,
                    record.confidence_score,
                    Resolution::Learned,
                ),
            });
        }

        let (category, confidence) = self.scorer.score(name);
        Ok((category, confidence, Resolution::Fuzzy))
    }

    /// Records a user correction for `(account_name, file_type)`.
    ///
    /// The stored prediction is reset to uncategorized at the fallback
    /// confidence, whatever was predicted before.
    pub async fn learn(
        &self,
        account_name: &str,
        file_type: &str,
        user_category: Category,
    ) -> Result<(), EngineError> {
        self.store
            .save(
                account_name,
                file_type,
                Category::Uncategorized,
                self.config.fallback_confidence.clamp(0.0, 1.0),
                Some(user_category),
            )
            .await?;
        tracing::info!("Learned correction: {} -> {}", account_name, user_category);
        Ok(())
    }

    /// Stored history for a statement type, sorted by account name.
    pub async fn history(&self, file_type: &str) -> Result<Vec<LearningRecord>, EngineError> {
        let mut records: Vec<LearningRecord> =
            self.store.get(file_type).await?.into_values().collect();
        records.sort_by(|a, b| a.account_name.cmp(&b.account_name));
        Ok(records)
    }
}
