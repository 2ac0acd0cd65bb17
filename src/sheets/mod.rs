//! Catalog spreadsheet sources.
//!
//! The catalog lives in a spreadsheet whose first row is the header. Sources
//! only fetch cells; turning them into games is the catalog module's job.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::catalog::{Cell, ImageTable};
use crate::config::SheetConfig;
use crate::errors::AppError;

/// Base URL of the Google Sheets v4 API.
const SHEETS_API_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Body of a Sheets `values.get` response. Rows may be ragged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValueRange {
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

impl ValueRange {
    /// Rows of cells. Empty strings and nulls become `None`.
    pub fn into_cells(self) -> Vec<Vec<Cell>> {
        self.values
            .into_iter()
            .map(|row| row.into_iter().map(cell_from_json).collect())
            .collect()
    }
}

fn cell_from_json(value: Value) -> Cell {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Read-only tabular source of catalog rows.
#[async_trait]
pub trait SheetSource: Send + Sync {
    /// All rows, header first.
    async fn fetch(&self) -> Result<Vec<Vec<Cell>>, AppError>;
}

/// No sheet configured.
pub struct EmptySheet;

#[async_trait]
impl SheetSource for EmptySheet {
    async fn fetch(&self) -> Result<Vec<Vec<Cell>>, AppError> {
        Ok(Vec::new())
    }
}

/// Sheet exported to a local JSON file.
pub struct FileSheet {
    path: PathBuf,
}

impl FileSheet {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SheetSource for FileSheet {
    async fn fetch(&self) -> Result<Vec<Vec<Cell>>, AppError> {
        let raw = tokio::fs::read(&self.path).await.map_err(|e| {
            AppError::Upstream(format!(
                "Failed to read sheet file {}: {}",
                self.path.display(),
                e
            ))
        })?;
        let range: ValueRange = serde_json::from_slice(&raw).map_err(|e| {
            AppError::Upstream(format!(
                "Sheet file {} is not a value range: {}",
                self.path.display(),
                e
            ))
        })?;
        Ok(range.into_cells())
    }
}

/// Google Sheets read through the public values API with an API key.
pub struct GoogleSheet {
    client: reqwest::Client,
    sheet_id: String,
    api_key: String,
    range: String,
}

impl GoogleSheet {
    pub fn new(sheet_id: String, api_key: String, range: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            sheet_id,
            api_key,
            range,
        }
    }
}

#[async_trait]
impl SheetSource for GoogleSheet {
    async fn fetch(&self) -> Result<Vec<Vec<Cell>>, AppError> {
        let url = format!("{}/{}/values/{}", SHEETS_API_URL, self.sheet_id, self.range);
        let range: ValueRange = self
            .client
            .get(url)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        tracing::debug!("Fetched {} sheet rows", range.values.len());
        Ok(range.into_cells())
    }
}

/// Build the source described by the configuration.
pub fn from_config(config: &SheetConfig) -> Box<dyn SheetSource> {
    match config {
        SheetConfig::None => Box::new(EmptySheet),
        SheetConfig::File(path) => Box::new(FileSheet::new(path.clone())),
        SheetConfig::Google {
            sheet_id,
            api_key,
            range,
        } => Box::new(GoogleSheet::new(
            sheet_id.clone(),
            api_key.clone(),
            range.clone(),
        )),
    }
}

/// Load the id to image table from a JSON object file.
pub async fn load_image_table(path: &Path) -> Result<ImageTable, AppError> {
    let raw = tokio::fs::read(path).await.map_err(|e| {
        AppError::Internal(format!(
            "Failed to read image map {}: {}",
            path.display(),
            e
        ))
    })?;
    let value: Value = serde_json::from_slice(&raw).map_err(|e| {
        AppError::Internal(format!("Image map {} is not JSON: {}", path.display(), e))
    })?;
    ImageTable::from_json(&value).ok_or_else(|| {
        AppError::Internal(format!(
            "Image map {} must be a JSON object",
            path.display()
        ))
    })
}
