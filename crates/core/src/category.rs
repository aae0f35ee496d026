use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Semantic bucket assigned to a statement line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Income,
    Expense,
    NetIncome,
    Uncategorized,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Income,
        Category::Expense,
        Category::NetIncome,
        Category::Uncategorized,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Income => "income",
            Category::Expense => "expense",
            Category::NetIncome => "net_income",
            Category::Uncategorized => "uncategorized",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown category: '{0}'")]
pub struct CategoryParseError(pub String);

impl std::str::FromStr for Category {
    type Err = CategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(Category::Income),
            "expense" => Ok(Category::Expense),
            "net_income" => Ok(Category::NetIncome),
            "uncategorized" => Ok(Category::Uncategorized),
            other => Err(CategoryParseError(other.to_string())),
        }
    }
}
