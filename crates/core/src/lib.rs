pub mod category;
pub mod config;
pub mod record;

pub use category::{Category, CategoryParseError};
pub use config::{CategorizerConfig, ConfigError};
pub use record::{account_name, row_with_account, CategorizedRow, LearningRecord, Row, Summary};
