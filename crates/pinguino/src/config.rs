//! Runtime settings resolved from command-line flags and environment

use std::path::PathBuf;

use url::Url;

use crate::dataset::{CsvFile, DataStore, RemoteCsv, DEFAULT_DATA_URL};
use crate::error::{PinguinoError, Result};
use crate::generation::{normalize_api_key, GenerationClient, DEFAULT_API_BASE, DEFAULT_MODEL};

/// Where the dataset is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataLocation {
  File(PathBuf),
  Remote(Url),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
  pub data: DataLocation,
  /// `None` when unset, empty or the placeholder value
  pub api_key: Option<String>,
  pub model: String,
  pub api_base: String,
}

impl Settings {
  /// A local path wins over a URL; with neither, the public dataset URL is used
  pub fn resolve(
    data: Option<PathBuf>,
    data_url: Option<&str>,
    api_key: Option<String>,
    model: Option<String>,
    api_base: Option<String>,
  ) -> Result<Self> {
    let data = match (data, data_url) {
      (Some(path), _) => DataLocation::File(path),
      (None, url) => {
        let raw = url.map(str::trim).filter(|u| !u.is_empty()).unwrap_or(DEFAULT_DATA_URL);
        let url = Url::parse(raw)
          .map_err(|e| PinguinoError::invalid_parameter("data-url", format!("{raw}: {e}")))?;
        DataLocation::Remote(url)
      }
    };

    let api_base = api_base
      .map(|b| b.trim().to_string())
      .filter(|b| !b.is_empty())
      .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
    Url::parse(&api_base)
      .map_err(|e| PinguinoError::invalid_parameter("api-base", format!("{api_base}: {e}")))?;

    Ok(Self {
      data,
      api_key: normalize_api_key(api_key),
      model: model
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
      api_base,
    })
  }

  pub fn data_store(&self) -> DataStore {
    match &self.data {
      DataLocation::File(path) => DataStore::new(Box::new(CsvFile::new(path.clone()))),
      DataLocation::Remote(url) => DataStore::new(Box::new(RemoteCsv::new(url.clone()))),
    }
  }

  pub fn generation_client(&self) -> GenerationClient {
    GenerationClient::create(self.api_key.clone(), self.model.clone(), &self.api_base)
  }
}
