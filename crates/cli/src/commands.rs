use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Read;
use std::path::Path;

use stmtcat_core::CategorizerConfig;
use stmtcat_engine::api::{self, ApiError, CategorizeRequest, LearnRequest};
use stmtcat_engine::CategorizationEngine;
use stmtcat_storage::{SqliteLearningStore, StoreOptions};

pub type Engine = CategorizationEngine<SqliteLearningStore>;

pub async fn open_engine(db_path: &Path, config_path: Option<&Path>) -> Result<Engine> {
    let config = match config_path {
        Some(path) => CategorizerConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => CategorizerConfig::default(),
    };

    let store = SqliteLearningStore::open(db_path, &StoreOptions::default())
        .await
        .with_context(|| format!("Failed to open learning store {}", db_path.display()))?;
    tracing::info!("Using learning store: {}", db_path.display());

    Ok(CategorizationEngine::new(store, config))
}

pub fn read_request(input: &Path, file_type: Option<String>) -> Result<CategorizeRequest> {
    let mut raw = String::new();
    if input == Path::new("-") {
        std::io::stdin()
            .read_to_string(&mut raw)
            .context("Failed to read request from stdin")?;
    } else {
        raw = std::fs::read_to_string(input)
            .with_context(|| format!("Failed to read {}", input.display()))?;
    }

    let mut request: CategorizeRequest =
        serde_json::from_str(&raw).context("Request is not valid JSON")?;
    if let Some(file_type) = file_type {
        request.file_type = file_type;
    }
    Ok(request)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Prints the error body the way a client would receive it, then fails the
/// process with the status attached.
fn report(err: ApiError) -> anyhow::Error {
    if let Err(e) = print_json(&err.body()) {
        tracing::warn!("Failed to print error body: {e}");
    }
    anyhow::anyhow!("Request failed ({}): {}", err.status_code(), err)
}

pub async fn cmd_categorize(engine: &Engine, input: &Path, file_type: Option<String>) -> Result<()> {
    let request = read_request(input, file_type)?;
    let response = api::categorize(engine, request).await.map_err(report)?;
    print_json(&response)
}

pub async fn cmd_learn(
    engine: &Engine,
    account_name: Option<String>,
    file_type: Option<String>,
    category: Option<String>,
) -> Result<()> {
    let request = LearnRequest {
        account_name,
        file_type,
        user_category: category,
    };
    let response = api::learn(engine, request).await.map_err(report)?;
    print_json(&response)
}

pub async fn cmd_history(engine: &Engine, file_type: &str) -> Result<()> {
    let records = engine.history(file_type).await?;
    print_json(&records)
}
