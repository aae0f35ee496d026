use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::Mutex;

use stmtcat_core::{Category, LearningRecord};

use crate::store::{LearningStore, StorageError};

/// Process-local store, used by tests and by callers that do not need
/// history to survive a restart.
#[derive(Debug, Default)]
pub struct MemoryLearningStore {
    // (file_type, account_name) -> record
    records: Mutex<HashMap<(String, String), LearningRecord>>,
}

impl MemoryLearningStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

#[async_trait]
impl LearningStore for MemoryLearningStore {
    async fn get(&self, file_type: &str) -> Result<HashMap<String, LearningRecord>, StorageError> {
        let records = self.records.lock().await;
        Ok(records
            .iter()
            .filter(|((ft, _), _)| ft == file_type)
            .map(|((_, name), record)| (name.clone(), record.clone()))
            .collect())
    }

    async fn find(
        &self,
        account_name: &str,
        file_type: &str,
    ) -> Result<Option<LearningRecord>, StorageError> {
        let records = self.records.lock().await;
        Ok(records
            .get(&(file_type.to_string(), account_name.to_string()))
            .cloned())
    }

    async fn save(
        &self,
        account_name: &str,
        file_type: &str,
        predicted_category: Category,
        confidence_score: f64,
        user_corrected_category: Option<Category>,
    ) -> Result<(), StorageError> {
        let now = Utc::now();
        // The lock is held across lookup and write, so the increment cannot race.
        let mut records = self.records.lock().await;
        records
            .entry((file_type.to_string(), account_name.to_string()))
            .and_modify(|record| {
                record.predicted_category = predicted_category;
                record.confidence_score = confidence_score;
                record.user_corrected_category = user_corrected_category;
                record.usage_count += 1;
                record.updated_at = now;
            })
            .or_insert_with(|| LearningRecord {
                account_name: account_name.to_string(),
                file_type: file_type.to_string(),
                predicted_category,
                confidence_score,
                user_corrected_category,
                usage_count: 1,
                created_at: now,
                updated_at: now,
            });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn first_save_inserts_with_count_one() {
        let store = MemoryLearningStore::new();
        store
            .save("Rent", "p&l", Category::Income, 0.85, None)
            .await
            .unwrap();

        let record = store.find("Rent", "p&l").await.unwrap().unwrap();
        assert_eq!(record.usage_count, 1);
        assert_eq!(record.predicted_category, Category::Income);
        assert_eq!(record.created_at, record.updated_at);
    }

    #[tokio::test]
    async fn repeat_save_overwrites_and_increments() {
        let store = MemoryLearningStore::new();
        store
            .save("Rent", "p&l", Category::Income, 0.85, None)
            .await
            .unwrap();
        store
            .save("Rent", "p&l", Category::Uncategorized, 0.3, Some(Category::Expense))
            .await
            .unwrap();

        let record = store.find("Rent", "p&l").await.unwrap().unwrap();
        assert_eq!(record.usage_count, 2);
        assert_eq!(record.predicted_category, Category::Uncategorized);
        assert_eq!(record.user_corrected_category, Some(Category::Expense));
        assert!(record.updated_at >= record.created_at);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn file_types_are_partitioned() {
        let store = MemoryLearningStore::new();
        store
            .save("Rent", "p&l", Category::Income, 0.85, None)
            .await
            .unwrap();
        store
            .save("Rent", "rent-roll", Category::Expense, 0.7, None)
            .await
            .unwrap();

        let pnl = store.get("p&l").await.unwrap();
        assert_eq!(pnl.len(), 1);
        assert_eq!(pnl["Rent"].predicted_category, Category::Income);
        assert!(store.get("balance").await.unwrap().is_empty());
        assert!(store.find("Rent", "balance").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn concurrent_saves_do_not_lose_updates() {
        let store = Arc::new(MemoryLearningStore::new());
        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..50 {
            let store = store.clone();
            tasks.spawn(async move {
                store
                    .save("Parking", "p&l", Category::Income, 0.85, None)
                    .await
            });
        }
        while let Some(result) = tasks.join_next().await {
            result.unwrap().unwrap();
        }

        let record = store.find("Parking", "p&l").await.unwrap().unwrap();
        assert_eq!(record.usage_count, 50);
    }
}
