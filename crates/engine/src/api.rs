//! Request/response shapes for the Categorize and Learn operations, with
//! validation split from internal failures.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use stmtcat_core::{CategorizedRow, Category, Row, Summary};
use stmtcat_storage::LearningStore;

use crate::engine::{CategorizationEngine, EngineError};

pub const DEFAULT_FILE_TYPE: &str = "general";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// The caller sent something unusable; nothing was attempted.
    #[error("{0}")]
    BadRequest(String),
    /// Storage or another internal step failed; no partial result exists.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Internal(_) => 500,
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.to_string(),
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

fn default_file_type() -> String {
    DEFAULT_FILE_TYPE.to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CategorizeRequest {
    #[serde(default)]
    pub csv_data: Vec<Row>,
    #[serde(default = "default_file_type")]
    pub file_type: String,
}

impl Default for CategorizeRequest {
    fn default() -> Self {
        Self {
            csv_data: Vec::new(),
            file_type: default_file_type(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorizeResponse {
    pub success: bool,
    pub categorized_data: Vec<CategorizedRow>,
    pub summary: Summary,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LearnRequest {
    pub account_name: Option<String>,
    pub file_type: Option<String>,
    pub user_category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnResponse {
    pub success: bool,
}

pub async fn categorize<S: LearningStore>(
    engine: &CategorizationEngine<S>,
    request: CategorizeRequest,
) -> Result<CategorizeResponse, ApiError> {
    if request.csv_data.is_empty() {
        return Err(ApiError::BadRequest("No CSV data provided".to_string()));
    }

    tracing::info!("Received {} rows for categorization", request.csv_data.len());

    let result = engine
        .categorize(&request.csv_data, &request.file_type)
        .await
        .map_err(|e| {
            tracing::error!("Categorization error: {e}");
            ApiError::from(e)
        })?;

    Ok(CategorizeResponse {
        success: true,
        categorized_data: result.categorized_data,
        summary: result.summary,
    })
}

pub async fn learn<S: LearningStore>(
    engine: &CategorizationEngine<S>,
    request: LearnRequest,
) -> Result<LearnResponse, ApiError> {
    let (Some(account_name), Some(file_type), Some(user_category)) = (
        non_empty(request.account_name),
        non_empty(request.file_type),
        non_empty(request.user_category),
    ) else {
        return Err(ApiError::BadRequest("Missing required fields".to_string()));
    };

    let user_category = Category::from_str(&user_category)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    engine
        .learn(&account_name, &file_type, user_category)
        .await
        .map_err(|e| {
            tracing::error!("Learning error: {e}");
            ApiError::from(e)
        })?;

    Ok(LearnResponse { success: true })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
