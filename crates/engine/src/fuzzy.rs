use std::sync::Arc;

use stmtcat_core::{CategorizerConfig, Category};

use crate::util::partial_ratio;

/// Lexical classifier scoring an account name against the configured
/// income, expense and total/summary keyword sets.
#[derive(Debug, Clone)]
pub struct FuzzyScorer {
    config: Arc<CategorizerConfig>,
}

impl FuzzyScorer {
    pub fn new(config: Arc<CategorizerConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CategorizerConfig {
        &self.config
    }

    pub fn score(&self, account_name: &str) -> (Category, f64) {
        let name = account_name.trim().to_lowercase();
        let config = &*self.config;

        if let Some(category) = self.summary_category(&name) {
            return (category, config.summary_confidence);
        }

        let income = best_score(&name, &config.income_keywords);
        let expense = best_score(&name, &config.expense_keywords);

        // Strict comparison: an exact tie goes to expense.
        if income > expense && income > config.match_threshold {
            (Category::Income, (income / 100.0).min(config.fuzzy_confidence_cap))
        } else if expense > config.match_threshold {
            (Category::Expense, (expense / 100.0).min(config.fuzzy_confidence_cap))
        } else {
            (Category::Uncategorized, config.fallback_confidence)
        }
    }

    /// Total/summary lines ("Total Expense", "Net Operating Income") classify
    /// by the word they summarize. Summary lines naming none of
    /// income/expense/net fall through to fuzzy scoring.
    fn summary_category(&self, name: &str) -> Option<Category> {
        let is_summary = self
            .config
            .total_keywords
            .iter()
            .any(|keyword| name.contains(keyword.as_str()));
        if !is_summary {
            return None;
        }

        if name.contains("income") {
            Some(Category::Income)
        } else if name.contains("expense") {
            Some(Category::Expense)
        } else if name.contains("net") {
            Some(Category::NetIncome)
        } else {
            None
        }
    }
}

fn best_score(name: &str, keywords: &[String]) -> f64 {
    keywords
        .iter()
        .map(|keyword| partial_ratio(name, keyword))
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> FuzzyScorer {
        FuzzyScorer::new(Arc::new(CategorizerConfig::default()))
    }

    #[test]
    fn summary_lines_score_point_nine() {
        let s = scorer();
        assert_eq!(s.score("Total Income"), (Category::Income, 0.9));
        assert_eq!(s.score("Net Operating Income"), (Category::Income, 0.9));
        assert_eq!(s.score("TOTAL EXPENSES"), (Category::Expense, 0.9));
        assert_eq!(s.score("Operating Expense - Admin"), (Category::Expense, 0.9));
        assert_eq!(s.score("Net Loss"), (Category::NetIncome, 0.9));
    }

    #[test]
    fn summary_without_direction_falls_through() {
        // "profit" marks a summary line but names none of income/expense/net.
        let (category, confidence) = scorer().score("Profit Sharing");
        assert_ne!(category, Category::NetIncome);
        assert!(confidence <= 0.85);
    }

    #[test]
    fn keyword_inside_name_scores_income() {
        assert_eq!(scorer().score("Parking Fees"), (Category::Income, 0.85));
        assert_eq!(scorer().score("  Airbnb payouts "), (Category::Income, 0.85));
    }

    #[test]
    fn keyword_inside_name_scores_expense() {
        assert_eq!(scorer().score("Maintenance"), (Category::Expense, 0.85));
        assert_eq!(scorer().score("Property Insurance"), (Category::Expense, 0.85));
    }

    #[test]
    fn exact_tie_goes_to_expense() {
        // "rent" and "cost" both align perfectly.
        assert_eq!(scorer().score("Rent Cost"), (Category::Expense, 0.85));
    }

    fn scorer_with(income: &str, expense: &str) -> FuzzyScorer {
        FuzzyScorer::new(Arc::new(CategorizerConfig {
            income_keywords: vec![income.into()],
            expense_keywords: vec![expense.into()],
            ..CategorizerConfig::default()
        }))
    }

    #[test]
    fn income_score_on_threshold_is_uncategorized() {
        // "abcxy" against "abcde" scores exactly 60.
        let s = scorer_with("abcde", "zzzzz");
        assert_eq!(s.score("abcxy"), (Category::Uncategorized, 0.3));
        assert_eq!(s.score("abcdy"), (Category::Income, 0.8));
    }

    #[test]
    fn expense_score_on_threshold_is_uncategorized() {
        let s = scorer_with("zzzzz", "abcde");
        assert_eq!(s.score("abcxy"), (Category::Uncategorized, 0.3));
        assert_eq!(s.score("abcdy"), (Category::Expense, 0.8));
    }

    #[test]
    fn unmatched_name_is_uncategorized() {
        assert_eq!(scorer().score("Zzyzx"), (Category::Uncategorized, 0.3));
        assert_eq!(scorer().score(""), (Category::Uncategorized, 0.3));
    }

    #[test]
    fn fuzzy_confidence_never_exceeds_cap() {
        for name in ["Rent", "Repairs", "Utilities", "Late Fees", "Landscaping", "Tax"] {
            let (category, confidence) = scorer().score(name);
            assert_ne!(category, Category::Uncategorized, "{name}");
            assert!(confidence > 0.6 && confidence <= 0.85, "{name}: {confidence}");
        }
    }

    #[test]
    fn confidence_stays_in_unit_interval() {
        for name in ["", "x", "Total", "Net", "Income", "Cost of Goods Sold", "Ω"] {
            let (category, confidence) = scorer().score(name);
            assert!((0.0..=1.0).contains(&confidence), "{name}: {confidence}");
            assert!(Category::ALL.contains(&category));
        }
    }

    #[test]
    fn custom_keywords_and_threshold_apply() {
        let config = CategorizerConfig {
            income_keywords: vec!["laundry".into()],
            expense_keywords: vec!["janitorial".into()],
            match_threshold: 95.0,
            ..CategorizerConfig::default()
        };
        let s = FuzzyScorer::new(Arc::new(config));
        assert_eq!(s.score("Laundry Machines"), (Category::Income, 0.85));
        assert_eq!(s.score("Janitorial"), (Category::Expense, 0.85));
        // One typo drops below the raised threshold.
        assert_eq!(s.score("Janitorail").0, Category::Uncategorized);
        assert_eq!(s.score("Rent"), (Category::Uncategorized, 0.3));
    }
}
