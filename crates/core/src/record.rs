use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::category::Category;

/// One uploaded statement line: `account_name` plus whatever sibling columns
/// the caller kept.
pub type Row = Map<String, Value>;

pub const ACCOUNT_NAME_FIELD: &str = "account_name";

/// Returns the row's account name when it is present and a string.
pub fn account_name(row: &Row) -> Option<&str> {
    row.get(ACCOUNT_NAME_FIELD).and_then(Value::as_str)
}

/// Builds a row holding only an account name. Mostly useful in tests.
pub fn row_with_account(name: &str) -> Row {
    let mut row = Row::new();
    row.insert(ACCOUNT_NAME_FIELD.to_string(), Value::String(name.to_string()));
    row
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorizedRow {
    #[serde(flatten)]
    pub fields: Row,
    pub ai_category: Category,
    pub confidence_score: f64,
}

impl CategorizedRow {
    pub fn new(row: &Row, category: Category, confidence: f64) -> Self {
        let mut fields = row.clone();
        fields.remove("ai_category");
        fields.remove("confidence_score");
        Self {
            fields,
            ai_category: category,
            confidence_score: confidence.clamp(0.0, 1.0),
        }
    }

    pub fn account_name(&self) -> Option<&str> {
        account_name(&self.fields)
    }
}

/// Stored history for one (account_name, file_type) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningRecord {
    pub account_name: String,
    pub file_type: String,
    pub predicted_category: Category,
    pub confidence_score: f64,
    pub user_corrected_category: Option<Category>,
    pub usage_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LearningRecord {
    /// The category this record resolves to, with a user correction winning
    /// over the stored machine guess.
    pub fn effective_category(&self) -> Category {
        self.user_corrected_category.unwrap_or(self.predicted_category)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Summary {
    pub total_records: usize,
    pub income_count: usize,
    pub expense_count: usize,
    pub net_income_count: usize,
    pub uncategorized_count: usize,
    /// Mean confidence over categorized rows; 0.0 for an empty batch.
    pub confidence_avg: f64,
}

impl Summary {
    pub fn from_rows(rows: &[CategorizedRow]) -> Self {
        let mut summary = Summary {
            total_records: rows.len(),
            ..Summary::default()
        };

        for row in rows {
            match row.ai_category {
                Category::Income => summary.income_count += 1,
                Category::Expense => summary.expense_count += 1,
                Category::NetIncome => summary.net_income_count += 1,
                Category::Uncategorized => summary.uncategorized_count += 1,
            }
        }

        if !rows.is_empty() {
            let total: f64 = rows.iter().map(|r| r.confidence_score).sum();
            summary.confidence_avg = total / rows.len() as f64;
        }

        summary
    }

    pub fn count(&self, category: Category) -> usize {
        match category {
            Category::Income => self.income_count,
            Category::Expense => self.expense_count,
            Category::NetIncome => self.net_income_count,
            Category::Uncategorized => self.uncategorized_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn categorized(name: &str, category: Category, confidence: f64) -> CategorizedRow {
        CategorizedRow::new(&row_with_account(name), category, confidence)
    }

    #[test]
    fn account_name_requires_string() {
        let mut row = Row::new();
        row.insert("account_name".into(), json!(42));
        assert_eq!(account_name(&row), None);
        assert_eq!(account_name(&row_with_account("Rent")), Some("Rent"));
        assert_eq!(account_name(&Row::new()), None);
    }

    #[test]
    fn categorized_row_keeps_sibling_fields() {
        let mut row = row_with_account("Rent Income");
        row.insert("amount".into(), json!(1200.5));
        row.insert("ai_category".into(), json!("stale"));

        let out = CategorizedRow::new(&row, Category::Income, 0.85);
        let value = serde_json::to_value(&out).unwrap();

        assert_eq!(value["account_name"], "Rent Income");
        assert_eq!(value["amount"], 1200.5);
        assert_eq!(value["ai_category"], "income");
        assert_eq!(value["confidence_score"], 0.85);
    }

    #[test]
    fn categorized_row_clamps_confidence() {
        assert_eq!(categorized("x", Category::Income, 1.4).confidence_score, 1.0);
        assert_eq!(categorized("x", Category::Income, -0.2).confidence_score, 0.0);
    }

    #[test]
    fn summary_counts_and_mean() {
        let rows = vec![
            categorized("Rent", Category::Income, 0.9),
            categorized("Repairs", Category::Expense, 0.8),
            categorized("Taxes", Category::Expense, 0.7),
            categorized("Misc", Category::Uncategorized, 0.3),
        ];
        let summary = Summary::from_rows(&rows);
        assert_eq!(summary.total_records, 4);
        assert_eq!(summary.income_count, 1);
        assert_eq!(summary.expense_count, 2);
        assert_eq!(summary.net_income_count, 0);
        assert_eq!(summary.uncategorized_count, 1);
        assert!((summary.confidence_avg - 0.675).abs() < 1e-9);
        assert_eq!(summary.count(Category::Expense), 2);
    }

    #[test]
    fn summary_of_empty_batch_is_zeroed() {
        let summary = Summary::from_rows(&[]);
        assert_eq!(summary.total_records, 0);
        assert_eq!(summary.confidence_avg, 0.0);
        assert!(!summary.confidence_avg.is_nan());
    }

    #[test]
    fn effective_category_prefers_correction() {
        let now = Utc::now();
        let mut record = LearningRecord {
            account_name: "Parking Fees".into(),
            file_type: "p&l".into(),
            predicted_category: Category::Income,
            confidence_score: 0.85,
            user_corrected_category: None,
            usage_count: 1,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(record.effective_category(), Category::Income);
        record.user_corrected_category = Some(Category::Expense);
        assert_eq!(record.effective_category(), Category::Expense);
    }
}
