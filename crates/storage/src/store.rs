use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use stmtcat_core::{Category, LearningRecord};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Stored record for '{account_name}' has invalid category: {value}")]
    CorruptCategory { account_name: String, value: String },
}

/// Categorization history keyed by (account_name, file_type).
///
/// `save` is an upsert: the first save of a pair inserts it with
/// `usage_count = 1`, later saves overwrite the prediction fields and bump
/// `usage_count` by one. Implementations must perform that increment
/// atomically with respect to concurrent saves of the same pair.
#[async_trait]
pub trait LearningStore: Send + Sync {
    /// All records for one statement type, keyed by account name.
    async fn get(&self, file_type: &str) -> Result<HashMap<String, LearningRecord>, StorageError>;

    /// The record for a single pair, if one exists.
    async fn find(
        &self,
        account_name: &str,
        file_type: &str,
    ) -> Result<Option<LearningRecord>, StorageError>;

    async fn save(
        &self,
        account_name: &str,
        file_type: &str,
        predicted_category: Category,
        confidence_score: f64,
        user_corrected_category: Option<Category>,
    ) -> Result<(), StorageError>;
}

#[async_trait]
impl<S: LearningStore + ?Sized> LearningStore for Arc<S> {
    async fn get(&self, file_type: &str) -> Result<HashMap<String, LearningRecord>, StorageError> {
        (**self).get(file_type).await
    }

    async fn find(
        &self,
        account_name: &str,
        file_type: &str,
    ) -> Result<Option<LearningRecord>, StorageError> {
        (**self).find(account_name, file_type).await
    }

    async fn save(
        &self,
        account_name: &str,
        file_type: &str,
        predicted_category: Category,
        confidence_score: f64,
        user_corrected_category: Option<Category>,
    ) -> Result<(), StorageError> {
        (**self)
            .save(
                account_name,
                file_type,
                predicted_category,
                confidence_score,
                user_corrected_category,
            )
            .await
    }
}
