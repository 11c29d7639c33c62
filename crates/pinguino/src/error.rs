use thiserror::Error;

/// Failures that stop a request from being served at all
#[derive(Error, Debug)]
pub enum PinguinoError {
  #[error("Failed to load dataset from {source_name}: {message}")]
  DataLoad { source_name: String, message: String },

  #[error("Failed to parse dataset row {row}: {message}")]
  DataParse { row: usize, message: String },

  #[error("Invalid parameter '{name}': {message}")]
  InvalidParameter { name: String, message: String },

  #[error("Unknown chart type '{name}' (expected scatter, box, violin or pair)")]
  UnknownChartKind { name: String },
}

impl PinguinoError {
  pub fn data_load(source_name: impl Into<String>, message: impl Into<String>) -> Self {
    Self::DataLoad { source_name: source_name.into(), message: message.into() }
  }

  pub fn data_parse(row: usize, message: impl Into<String>) -> Self {
    Self::DataParse { row, message: message.into() }
  }

  pub fn invalid_parameter(name: impl Into<String>, message: impl Into<String>) -> Self {
    Self::InvalidParameter { name: name.into(), message: message.into() }
  }

  pub fn unknown_chart_kind(name: impl Into<String>) -> Self {
    Self::UnknownChartKind { name: name.into() }
  }
}

pub type Result<T> = std::result::Result<T, PinguinoError>;
