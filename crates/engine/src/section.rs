use std::collections::HashMap;

use stmtcat_core::{account_name, Category, Row};

/// Placeholder labels that never receive a section tag.
const IGNORED_LABELS: [&str; 2] = ["total", "subtotal"];

/// Infers a running income/expense/net-income section from header-like rows.
///
/// Positional heuristic: every named row after a header inherits that
/// header's section until the next header changes it. Headers are tagged
/// with the section they open.
#[derive(Debug, Clone, Copy, Default)]
pub struct SectionDetector;

impl SectionDetector {
    pub fn new() -> Self {
        Self
    }

    /// Maps each raw account name to the section active when it was last seen.
    pub fn detect(&self, rows: &[Row]) -> HashMap<String, Category> {
        let mut sections = HashMap::new();
        let mut current: Option<Category> = None;

        for row in rows {
            let Some(raw) = account_name(row) else {
                continue;
            };
            let name = raw.trim().to_lowercase();

            if let Some(section) = header_section(&name) {
                current = Some(section);
            }

            if let Some(section) = current {
                if !name.is_empty() && !IGNORED_LABELS.contains(&name.as_str()) {
                    sections.insert(raw.to_string(), section);
                }
            }
        }

        sections
    }
}

/// Returns the section a header opens, or `None` when `name` leaves the
/// current section untouched.
///
/// A name mentioning income/revenue is only ever judged by the income rule,
/// so "Net Income" alone does not open the net-income section; "Net Profit"
/// does.
fn header_section(name: &str) -> Option<Category> {
    if name.contains("income") || name.contains("revenue") {
        if name.contains("total") || name.contains("gross") || name.contains("operating") {
            return Some(Category::Income);
        }
        None
    } else if name.contains("expense") || name.contains("cost") {
        if name.contains("total") || name.contains("operating") {
            return Some(Category::Expense);
        }
        None
    } else if name.contains("net income") || name.contains("profit") {
        Some(Category::NetIncome)
    } else {
        None
    }
}
