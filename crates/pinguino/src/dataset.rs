//! Data provider for the penguin morphology table
//!
//! The dataset is fetched once from a [`DataSource`], parsed from CSV and kept
//! behind a [`DataStore`] for the rest of the process. Rows with any missing
//! field are dropped from the clean view, which is the only view the rest of
//! the pipeline consumes.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{PinguinoError, Result};

/// Public copy of the Palmer penguins table used by the seaborn project
pub const DEFAULT_DATA_URL: &str =
  "https://raw.githubusercontent.com/mwaskom/seaborn-data/master/penguins.csv";

pub const REQUIRED_COLUMNS: [&str; 7] = [
  "species",
  "island",
  "bill_length_mm",
  "bill_depth_mm",
  "flipper_length_mm",
  "body_mass_g",
  "sex",
];

const MISSING_MARKERS: [&str; 8] = ["", "NA", "N/A", "n/a", "NaN", "nan", "null", "NULL"];

/// Numeric measurement columns, in table order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericColumn {
  BillLength,
  BillDepth,
  FlipperLength,
  BodyMass,
}

impl NumericColumn {
  pub const ALL: [NumericColumn; 4] = [
    NumericColumn::BillLength,
    NumericColumn::BillDepth,
    NumericColumn::FlipperLength,
    NumericColumn::BodyMass,
  ];

  pub fn name(&self) -> &'static str {
    match self {
      NumericColumn::BillLength => "bill_length_mm",
      NumericColumn::BillDepth => "bill_depth_mm",
      NumericColumn::FlipperLength => "flipper_length_mm",
      NumericColumn::BodyMass => "body_mass_g",
    }
  }

  pub fn value(&self, record: &Record) -> f64 {
    match self {
      NumericColumn::BillLength => record.bill_length_mm,
      NumericColumn::BillDepth => record.bill_depth_mm,
      NumericColumn::FlipperLength => record.flipper_length_mm,
      NumericColumn::BodyMass => record.body_mass_g,
    }
  }
}

/// One observed individual as it appears in the source, any field may be missing
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawRecord {
  pub species: Option<String>,
  pub island: Option<String>,
  #[serde(deserialize_with = "csv::invalid_option")]
  pub bill_length_mm: Option<f64>,
  #[serde(deserialize_with = "csv::invalid_option")]
  pub bill_depth_mm: Option<f64>,
  #[serde(deserialize_with = "csv::invalid_option")]
  pub flipper_length_mm: Option<f64>,
  #[serde(deserialize_with = "csv::invalid_option")]
  pub body_mass_g: Option<f64>,
  pub sex: Option<String>,
}

/// One observed individual with every field present
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
  pub species: String,
  pub island: String,
  pub bill_length_mm: f64,
  pub bill_depth_mm: f64,
  pub flipper_length_mm: f64,
  pub body_mass_g: f64,
  pub sex: String,
}

fn present_text(value: &Option<String>) -> Option<String> {
  let value = value.as_deref()?.trim();
  if MISSING_MARKERS.contains(&value) {
    None
  } else {
    Some(value.to_string())
  }
}

fn present_number(value: Option<f64>) -> Option<f64> {
  value.filter(|v| v.is_finite())
}

impl RawRecord {
  /// The clean form of this row, or `None` when any field is missing
  pub fn to_clean(&self) -> Option<Record> {
    Some(Record {
      species: present_text(&self.species)?,
      island: present_text(&self.island)?,
      bill_length_mm: present_number(self.bill_length_mm)?,
      bill_depth_mm: present_number(self.bill_depth_mm)?,
      flipper_length_mm: present_number(self.flipper_length_mm)?,
      body_mass_g: present_number(self.body_mass_g)?,
      sex: present_text(&self.sex)?,
    })
  }
}

impl From<&Record> for RawRecord {
  fn from(record: &Record) -> Self {
    Self {
      species: Some(record.species.clone()),
      island: Some(record.island.clone()),
      bill_length_mm: Some(record.bill_length_mm),
      bill_depth_mm: Some(record.bill_depth_mm),
      flipper_length_mm: Some(record.flipper_length_mm),
      body_mass_g: Some(record.body_mass_g),
      sex: Some(record.sex.clone()),
    }
  }
}

/// The loaded table: raw rows plus the clean view derived from them
#[derive(Debug, Clone, Default)]
pub struct Dataset {
  raw: Vec<RawRecord>,
  clean: Vec<Record>,
}

impl Dataset {
  pub fn from_raw(raw: Vec<RawRecord>) -> Self {
    let clean: Vec<Record> = raw.iter().filter_map(RawRecord::to_clean).collect();
    Self { raw, clean }
  }

  /// Build a dataset whose raw and clean views are the same rows
  pub fn from_records(records: Vec<Record>) -> Self {
    let raw = records.iter().map(RawRecord::from).collect();
    Self { raw, clean: records }
  }

  /// Parse CSV text with a header row naming every required column
  pub fn from_csv_str(text: &str, source_name: &str) -> Result<Self> {
    let mut reader =
      csv::ReaderBuilder::new().has_headers(true).trim(csv::Trim::All).from_reader(text.as_bytes());

    let headers =
      reader.headers().map_err(|e| PinguinoError::data_load(source_name, e.to_string()))?.clone();
    let missing: Vec<&str> = REQUIRED_COLUMNS
      .iter()
      .copied()
      .filter(|column| !headers.iter().any(|h| h == *column))
      .collect();
    if !missing.is_empty() {
      return Err(PinguinoError::data_load(
        source_name,
        format!("missing columns: {}", missing.join(", ")),
      ));
    }

    let mut raw = Vec::new();
    for (index, row) in reader.deserialize::<RawRecord>().enumerate() {
      raw.push(row.map_err(|e| PinguinoError::data_parse(index + 1, e.to_string()))?);
    }

    Ok(Self::from_raw(raw))
  }

  pub fn raw(&self) -> &[RawRecord] {
    &self.raw
  }

  pub fn clean(&self) -> &[Record] {
    &self.clean
  }

  pub fn len(&self) -> usize {
    self.clean.len()
  }

  pub fn is_empty(&self) -> bool {
    self.clean.is_empty()
  }

  /// Distinct species in the clean view, in order of first appearance
  pub fn species(&self) -> Vec<String> {
    distinct(self.clean.iter().map(|r| r.species.as_str()))
  }

  /// Distinct islands in the clean view, in order of first appearance
  pub fn islands(&self) -> Vec<String> {
    distinct(self.clean.iter().map(|r| r.island.as_str()))
  }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
  let mut seen: Vec<String> = Vec::new();
  for value in values {
    if !seen.iter().any(|s| s == value) {
      seen.push(value.to_string());
    }
  }
  seen
}

/// Where the CSV text comes from
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DataSource: Send + Sync {
  /// Human-readable name used in logs and errors
  fn name(&self) -> String;

  /// Fetch the full CSV text
  async fn fetch(&self) -> Result<String>;
}

/// CSV file on the local filesystem
pub struct CsvFile {
  path: PathBuf,
}

impl CsvFile {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }
}

#[async_trait]
impl DataSource for CsvFile {
  fn name(&self) -> String {
    self.path.display().to_string()
  }

  async fn fetch(&self) -> Result<String> {
    tokio::fs::read_to_string(&self.path)
      .await
      .map_err(|e| PinguinoError::data_load(self.name(), e.to_string()))
  }
}

/// CSV served over HTTP(S)
pub struct RemoteCsv {
  url: Url,
  client: reqwest::Client,
}

impl RemoteCsv {
  pub fn new(url: Url) -> Self {
    Self { url, client: reqwest::Client::new() }
  }
}

#[async_trait]
impl DataSource for RemoteCsv {
  fn name(&self) -> String {
    self.url.to_string()
  }

  async fn fetch(&self) -> Result<String> {
    let response = self
      .client
      .get(self.url.clone())
      .send()
      .await
      .map_err(|e| PinguinoError::data_load(self.name(), e.to_string()))?;

    if !response.status().is_success() {
      return Err(PinguinoError::data_load(
        self.name(),
        format!("server answered {}", response.status()),
      ));
    }

    response.text().await.map_err(|e| PinguinoError::data_load(self.name(), e.to_string()))
  }
}

/// CSV text already in memory
pub struct InlineCsv {
  name: String,
  text: String,
}

impl InlineCsv {
  pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
    Self { name: name.into(), text: text.into() }
  }
}

#[async_trait]
impl DataSource for InlineCsv {
  fn name(&self) -> String {
    self.name.clone()
  }

  async fn fetch(&self) -> Result<String> {
    Ok(self.text.clone())
  }
}

/// Process-lifetime owner of the dataset; the source is read at most once
pub struct DataStore {
  source: Box<dyn DataSource>,
  dataset: OnceCell<Arc<Dataset>>,
}

impl DataStore {
  pub fn new(source: Box<dyn DataSource>) -> Self {
    Self { source, dataset: OnceCell::new() }
  }

  /// A store that already holds `dataset` and never touches a source
  pub fn preloaded(dataset: Dataset) -> Self {
    Self {
      source: Box::new(InlineCsv::new("preloaded", String::new())),
      dataset: OnceCell::new_with(Some(Arc::new(dataset))),
    }
  }

  pub fn source_name(&self) -> String {
    self.source.name()
  }

  /// The clean dataset, loading it on first use
  pub async fn load(&self) -> Result<Arc<Dataset>> {
    let dataset = self
      .dataset
      .get_or_try_init(|| async {
        let name = self.source.name();
        debug!(source = %name, "fetching dataset");
        let text = self.source.fetch().await?;
        let dataset = Dataset::from_csv_str(&text, &name)?;
        let dropped = dataset.raw().len() - dataset.len();
        info!(source = %name, rows = dataset.len(), dropped, "dataset loaded");
        if dataset.is_empty() {
          warn!(source = %name, "dataset has no complete rows");
        }
        Ok::<_, PinguinoError>(Arc::new(dataset))
      })
      .await?;
    Ok(Arc::clone(dataset))
  }
}
